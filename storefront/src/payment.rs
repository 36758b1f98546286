// storefront/src/payment.rs

//! Bridge between the hosted payment widget and order status.
//!
//! Payment itself happens at the provider. This module builds the widget request and
//! turns the provider's redirect back into an order status change.

use crate::errors::{AppError, Result};
use crate::flows::ConfirmPaymentCtxData;
use crate::models::{Order, OrderStatus, OrderWithItems, UserId};
use crate::orders::PlacedOrder;
use crate::revalidate::{order_path, ORDERS_PATH};
use crate::storefront::{flow_incomplete, Storefront};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub const SUCCESS_CALLBACK_PATH: &str = "/api/v1/payments/success";
pub const FAIL_CALLBACK_PATH: &str = "/api/v1/payments/fail";
const DEFAULT_CUSTOMER_NAME: &str = "고객";

/// Widget parameters for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
  pub order_id: Uuid,
  pub amount: i64,
  pub order_name: String,
  pub customer_name: String,
  pub success_url: String,
  pub fail_url: String,
}

/// Query parameters of the provider's success redirect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSuccessParams {
  pub order_id: Uuid,
  #[serde(default)]
  pub payment_key: Option<String>,
  #[serde(default)]
  pub amount: Option<String>,
}

impl PaymentSuccessParams {
  /// The reported amount. Absent means "not reported"; anything that is not a whole
  /// number of won is rejected.
  pub fn paid_amount(&self) -> Result<Option<i64>> {
    let Some(raw) = self.amount.as_deref().map(str::trim).filter(|s| !s.is_empty()) else {
      return Ok(None);
    };
    if let Ok(whole) = raw.parse::<i64>() {
      return Ok(Some(whole));
    }
    match raw.parse::<f64>() {
      Ok(value) if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 => {
        Ok(Some(value as i64))
      }
      _ => Err(AppError::Validation(format!("결제 금액이 올바르지 않습니다. ({})", raw))),
    }
  }
}

/// Query parameters of the provider's failure redirect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailParams {
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub message: Option<String>,
  #[serde(default)]
  pub order_id: Option<String>,
}

impl PaymentFailParams {
  pub fn display_message(&self) -> String {
    let message = self
      .message
      .as_deref()
      .filter(|m| !m.trim().is_empty())
      .or_else(|| self.code.as_deref().and_then(local_failure_message));
    match (message, self.code.as_deref()) {
      (None, None) => "결제에 실패했습니다.".to_string(),
      (message, code) => {
        let code_part = code.map(|c| format!("(코드: {})", c)).unwrap_or_default();
        format!("{} {}", message.unwrap_or(""), code_part).trim().to_string()
      }
    }
  }

  pub fn order_uuid(&self) -> Option<Uuid> {
    self.order_id.as_deref().and_then(|id| Uuid::parse_str(id.trim()).ok())
  }
}

// Codes this service puts on its own failure redirects.
fn local_failure_message(code: &str) -> Option<&'static str> {
  match code {
    "amount_mismatch" => Some("결제 금액이 일치하지 않습니다."),
    "confirm_failed" => Some("주문 확인에 실패했습니다."),
    _ => None,
  }
}

/// Order title shown by the widget: the first product, plus a count of the rest.
pub fn order_name(product_names: &[&str]) -> String {
  match product_names {
    [] => String::new(),
    [only] => only.to_string(),
    [first, rest @ ..] => format!("{} 외 {}개", first, rest.len()),
  }
}

/// Failure redirect for a rejected confirmation. `code` must be URL-safe ASCII.
pub fn fail_redirect_url(app_base_url: &str, order_id: Uuid, code: &str) -> String {
  format!("{}{}?orderId={}&code={}", app_base_url, FAIL_CALLBACK_PATH, order_id, code)
}

impl PaymentRequest {
  pub fn for_order(order: &OrderWithItems, customer_name: Option<&str>, app_base_url: &str) -> Self {
    let names: Vec<&str> = order.items.iter().map(|i| i.product_name.as_str()).collect();
    Self::build(order.order.id, order.order.total_amount, order_name(&names), customer_name, app_base_url)
  }

  /// Straight from the result of `create_order`, with no further store reads.
  pub fn for_placed(placed: &PlacedOrder, customer_name: Option<&str>, app_base_url: &str) -> Self {
    Self::build(
      placed.order_id,
      placed.total_amount,
      placed.order_name.clone(),
      customer_name,
      app_base_url,
    )
  }

  fn build(order_id: Uuid, amount: i64, order_name: String, customer_name: Option<&str>, app_base_url: &str) -> Self {
    let customer_name = customer_name
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .unwrap_or(DEFAULT_CUSTOMER_NAME);
    Self {
      order_id,
      amount,
      order_name,
      customer_name: customer_name.to_string(),
      success_url: format!("{}{}", app_base_url, SUCCESS_CALLBACK_PATH),
      fail_url: format!("{}{}", app_base_url, FAIL_CALLBACK_PATH),
    }
  }
}

impl Storefront {
  /// Moves a paid `pending` order to `confirmed`.
  ///
  /// `paid_amount` comes from the client-side redirect and is only compared with the
  /// order total; it is not verified with the provider.
  #[instrument(name = "Storefront::confirm_order", skip(self), fields(user_id = %user))]
  pub async fn confirm_order(&self, user: &UserId, order_id: Uuid, paid_amount: Option<i64>) -> Result<Order> {
    let ctx = self
      .run_flow(ConfirmPaymentCtxData::new(self.scope(user), order_id, paid_amount))
      .await?;
    let order = ctx.read().order.clone().ok_or_else(|| flow_incomplete("a confirmed order"))?;
    self.invalidate(&[ORDERS_PATH, &order_path(order_id)]);
    Ok(order)
  }

  /// Widget parameters for one of the user's orders, for reopening the payment of a stored order.
  pub async fn payment_request(&self, user: &UserId, order_id: Uuid, customer_name: Option<&str>) -> Result<PaymentRequest> {
    let order = self.get_order(user, order_id).await?;
    Ok(PaymentRequest::for_order(&order, customer_name, &self.config().app_base_url))
  }

  /// Handles the provider's failure redirect and returns the message to show.
  ///
  /// A still-pending order named by the redirect is cancelled; anything else is left as is.
  #[instrument(name = "Storefront::record_payment_failure", skip(self), fields(user_id = %user))]
  pub async fn record_payment_failure(&self, user: &UserId, params: &PaymentFailParams) -> Result<String> {
    let message = params.display_message();
    let Some(order_id) = params.order_uuid() else {
      return Ok(message);
    };

    let scope = self.scope(user);
    match scope.get_order(order_id).await? {
      Some(order) if order.status.shopper_can_transition_to(OrderStatus::Cancelled) => {
        let updated = scope
          .update_order_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
          .await?;
        if updated > 0 {
          info!(%order_id, code = ?params.code, "Pending order cancelled after payment failure.");
          self.invalidate(&[ORDERS_PATH, &order_path(order_id)]);
        }
      }
      Some(order) => {
        info!(%order_id, status = %order.status, "Payment failure for an order that is no longer pending.");
      }
      None => warn!(%order_id, "Payment failure for an unknown order."),
    }
    Ok(message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn order_name_counts_the_other_lines() {
    assert_eq!(order_name(&["셔츠"]), "셔츠");
    assert_eq!(order_name(&["셔츠", "모자"]), "셔츠 외 1개");
    assert_eq!(order_name(&["셔츠", "모자", "양말"]), "셔츠 외 2개");
    assert_eq!(order_name(&[]), "");
  }

  #[test]
  fn fail_redirect_carries_order_and_code() {
    let url = fail_redirect_url("https://shop.example.com", Uuid::nil(), "amount_mismatch");
    assert_eq!(
      url,
      "https://shop.example.com/api/v1/payments/fail?orderId=00000000-0000-0000-0000-000000000000&code=amount_mismatch"
    );
  }

  #[test]
  fn paid_amount_parsing() {
    let params = |amount: Option<&str>| PaymentSuccessParams {
      order_id: Uuid::nil(),
      payment_key: None,
      amount: amount.map(str::to_string),
    };
    assert_eq!(params(Some("59000")).paid_amount().unwrap(), Some(59000));
    assert_eq!(params(Some("59000.0")).paid_amount().unwrap(), Some(59000));
    assert_eq!(params(None).paid_amount().unwrap(), None);
    assert_eq!(params(Some(" ")).paid_amount().unwrap(), None);
    assert!(params(Some("59000.5")).paid_amount().is_err());
    assert!(params(Some("free")).paid_amount().is_err());
  }

  #[test]
  fn fail_message_formats() {
    assert_eq!(PaymentFailParams::default().display_message(), "결제에 실패했습니다.");

    let provider = PaymentFailParams {
      code: Some("PAY_PROCESS_CANCELED".to_string()),
      message: Some("사용자가 결제를 취소했습니다".to_string()),
      order_id: None,
    };
    assert_eq!(
      provider.display_message(),
      "사용자가 결제를 취소했습니다 (코드: PAY_PROCESS_CANCELED)"
    );

    let local = PaymentFailParams {
      code: Some("amount_mismatch".to_string()),
      ..Default::default()
    };
    assert_eq!(local.display_message(), "결제 금액이 일치하지 않습니다. (코드: amount_mismatch)");

    let code_only = PaymentFailParams {
      code: Some("UNKNOWN".to_string()),
      ..Default::default()
    };
    assert_eq!(code_only.display_message(), "(코드: UNKNOWN)");
  }
}
