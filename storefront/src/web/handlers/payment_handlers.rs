// storefront/src/web/handlers/payment_handlers.rs

//! Redirect targets of the hosted payment widget.

use actix_web::{http::header, web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::payment::{fail_redirect_url, PaymentFailParams, PaymentSuccessParams};
use crate::revalidate::{order_path, ORDERS_PATH};
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

fn redirect_to(location: String) -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, location))
    .finish()
}

/// Confirms the order and sends the shopper to its page.
///
/// Rejections never produce an error page here: a missing order goes to the order
/// list, an order that was already processed goes to its page, and everything else
/// goes to the failure redirect with a code.
#[instrument(
    name = "handler::payment_success",
    skip(app_state, params, auth_user),
    fields(user_id = %auth_user.user_id, order_id = %params.order_id)
)]
pub async fn payment_success_handler(
  app_state: web::Data<AppState>,
  params: web::Query<PaymentSuccessParams>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let base = app_state.config.app_base_url.as_str();
  let order_id = params.order_id;

  let paid_amount = match params.paid_amount() {
    Ok(amount) => amount,
    Err(e) => {
      warn!(error = %e, "Unreadable payment amount.");
      return Ok(redirect_to(fail_redirect_url(base, order_id, "amount_mismatch")));
    }
  };

  let location = match app_state
    .storefront
    .confirm_order(&auth_user.user_id, order_id, paid_amount)
    .await
  {
    Ok(_) => {
      info!("Payment confirmed.");
      format!("{}{}", base, order_path(order_id))
    }
    Err(AppError::OrderNotFound) => format!("{}{}", base, ORDERS_PATH),
    Err(AppError::AlreadyProcessed { status }) => {
      info!(%status, "Payment redirect for an order that is already processed.");
      format!("{}{}", base, order_path(order_id))
    }
    Err(AppError::AmountMismatch { expected, paid }) => {
      warn!(expected, paid, "Payment amount mismatch.");
      fail_redirect_url(base, order_id, "amount_mismatch")
    }
    Err(e) => {
      if e.is_incident() {
        tracing::error!(error = %e, "Payment confirmation failed.");
      }
      fail_redirect_url(base, order_id, "confirm_failed")
    }
  };
  Ok(redirect_to(location))
}

#[instrument(name = "handler::payment_fail", skip(app_state, params, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn payment_fail_handler(
  app_state: web::Data<AppState>,
  params: web::Query<PaymentFailParams>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let message = app_state
    .storefront
    .record_payment_failure(&auth_user.user_id, &params)
    .await?;
  Ok(HttpResponse::Ok().json(json!({
    "message": message,
    "code": params.code,
    "orderId": params.order_id,
  })))
}
