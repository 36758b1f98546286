// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::orders::CreateOrderInput;
use crate::payment::PaymentRequest;
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  #[serde(flatten)]
  pub order: CreateOrderInput,
  /// Shown in the payment widget; defaults to a generic name.
  #[serde(default)]
  pub customer_name: Option<String>,
}

#[instrument(name = "handler::create_order", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<CreateOrderPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let CreateOrderPayload { order, customer_name } = req_payload.into_inner();
  let placed = app_state.storefront.create_order(&auth_user.user_id, order).await?;
  let payment = PaymentRequest::for_placed(&placed, customer_name.as_deref(), &app_state.config.app_base_url);
  info!(order_id = %placed.order_id, "Order created, payment request issued.");
  Ok(HttpResponse::Created().json(json!({ "order": placed, "payment": payment })))
}

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.storefront.list_orders(&auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state.storefront.get_order(&auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let order = app_state.storefront.cancel_order(&auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequestQuery {
  #[serde(default)]
  pub customer_name: Option<String>,
}

#[instrument(name = "handler::order_payment", skip(app_state, query, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn order_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  query: web::Query<PaymentRequestQuery>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let payment = app_state
    .storefront
    .payment_request(&auth_user.user_id, path.into_inner(), query.customer_name.as_deref())
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "payment": payment })))
}
