// storefront/src/models/order.rs

use super::{OrderItem, UserId};
use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, SqlxType)]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Shipped,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  /// Allowed edges of the order lifecycle.
  ///
  /// `pending -> confirmed` is reserved for payment confirmation; shipping transitions
  /// and cancellation of confirmed/shipped orders are driven from outside this crate.
  pub fn can_transition_to(&self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    if self.is_terminal() {
      return false;
    }
    matches!(
      (self, next),
      (Pending, Confirmed) | (Pending, Cancelled) | (Confirmed, Shipped) | (Shipped, Delivered) | (Confirmed, Cancelled) | (Shipped, Cancelled)
    )
  }

  /// The subset of edges a shopper may trigger: paying or abandoning an order awaiting payment.
  pub fn shopper_can_transition_to(&self, next: OrderStatus) -> bool {
    *self == OrderStatus::Pending && self.can_transition_to(next)
  }

  /// `AlreadyProcessed` unless the shopper may move the order from `self` to `next`.
  pub fn ensure_shopper_transition(&self, next: OrderStatus) -> Result<(), AppError> {
    if self.shopper_can_transition_to(next) {
      Ok(())
    } else {
      Err(AppError::AlreadyProcessed { status: *self })
    }
  }

  pub fn is_terminal(&self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Shipped => "shipped",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  /// Badge text on the order pages.
  pub fn label(&self) -> &'static str {
    match self {
      OrderStatus::Pending => "대기 중",
      OrderStatus::Confirmed => "확인됨",
      OrderStatus::Shipped => "배송 중",
      OrderStatus::Delivered => "배송 완료",
      OrderStatus::Cancelled => "취소됨",
    }
  }
}

impl std::fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Where an order ships. Stored as a JSON document on the order row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
  pub postal_code: String,
  pub address: String,
  pub detail_address: String,
  pub recipient_name: String,
  pub recipient_phone: String,
}

impl ShippingAddress {
  /// Checks the checkout form rules, reporting the first violated one.
  pub fn validate(&self) -> Result<(), AppError> {
    fn at_least(value: &str, min: usize) -> bool {
      value.trim().chars().count() >= min
    }

    if !at_least(&self.recipient_name, 2) {
      return Err(AppError::Validation("받는 분 이름을 입력해주세요.".to_string()));
    }
    if !at_least(&self.recipient_phone, 10) {
      return Err(AppError::Validation("전화번호를 올바르게 입력해주세요.".to_string()));
    }
    if !self.recipient_phone.chars().all(|c| c.is_ascii_digit() || c == '-') {
      return Err(AppError::Validation(
        "전화번호는 숫자와 하이픈(-)만 입력 가능합니다.".to_string(),
      ));
    }
    if !at_least(&self.postal_code, 5) {
      return Err(AppError::Validation("우편번호를 입력해주세요.".to_string()));
    }
    if !at_least(&self.address, 5) {
      return Err(AppError::Validation("주소를 입력해주세요.".to_string()));
    }
    if !at_least(&self.detail_address, 2) {
      return Err(AppError::Validation("상세주소를 입력해주세요.".to_string()));
    }
    Ok(())
  }
}

/// A placed order. Only `status` (and `updated_at`) ever changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Order {
  pub id: Uuid,
  pub user_id: UserId,
  pub total_amount: i64,
  pub status: OrderStatus,
  #[sqlx(json)]
  pub shipping_address: ShippingAddress,
  pub order_note: Option<String>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
  pub id: Uuid,
  pub user_id: UserId,
  pub total_amount: i64,
  pub shipping_address: ShippingAddress,
  pub order_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWithItems {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderItem>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn valid_address() -> ShippingAddress {
    ShippingAddress {
      postal_code: "06236".to_string(),
      address: "서울특별시 강남구 테헤란로 152".to_string(),
      detail_address: "12층".to_string(),
      recipient_name: "김철수".to_string(),
      recipient_phone: "010-1234-5678".to_string(),
    }
  }

  #[test]
  fn status_machine_edges() {
    use OrderStatus::*;
    assert!(Pending.can_transition_to(Confirmed));
    assert!(Pending.can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(Shipped));
    assert!(Shipped.can_transition_to(Delivered));
    assert!(Shipped.can_transition_to(Cancelled));

    assert!(!Confirmed.can_transition_to(Pending));
    assert!(!Pending.can_transition_to(Shipped));
    assert!(!Delivered.can_transition_to(Cancelled));
    assert!(!Cancelled.can_transition_to(Confirmed));
  }

  #[test]
  fn shopper_edges_start_from_pending_only() {
    use OrderStatus::*;
    assert!(Pending.shopper_can_transition_to(Confirmed));
    assert!(Pending.shopper_can_transition_to(Cancelled));
    assert!(Confirmed.can_transition_to(Cancelled));
    assert!(!Confirmed.shopper_can_transition_to(Cancelled));
    assert!(!Shipped.shopper_can_transition_to(Cancelled));
    assert!(!Pending.shopper_can_transition_to(Shipped));

    assert!(Pending.ensure_shopper_transition(Confirmed).is_ok());
    match Confirmed.ensure_shopper_transition(Confirmed) {
      Err(AppError::AlreadyProcessed { status }) => assert_eq!(status, Confirmed),
      other => panic!("expected AlreadyProcessed, got {:?}", other),
    }
    match Cancelled.ensure_shopper_transition(Cancelled) {
      Err(AppError::AlreadyProcessed { status }) => assert_eq!(status, Cancelled),
      other => panic!("expected AlreadyProcessed, got {:?}", other),
    }
  }

  #[test]
  fn terminal_states_have_no_outgoing_edges() {
    let all = [
      OrderStatus::Pending,
      OrderStatus::Confirmed,
      OrderStatus::Shipped,
      OrderStatus::Delivered,
      OrderStatus::Cancelled,
    ];
    for from in all.iter().filter(|s| s.is_terminal()) {
      assert!(all.iter().all(|to| !from.can_transition_to(*to)), "{} has an outgoing edge", from);
    }
  }

  #[test]
  fn status_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&OrderStatus::Confirmed).unwrap(), "\"confirmed\"");
    assert_eq!(OrderStatus::Cancelled.label(), "취소됨");
    let rejected = AppError::AlreadyProcessed { status: OrderStatus::Shipped };
    assert_eq!(rejected.user_message(), "이미 처리된 주문입니다. (상태: 배송 중)");
  }

  #[test]
  fn valid_shipping_address_passes() {
    assert!(valid_address().validate().is_ok());
  }

  #[test]
  fn phone_with_letters_is_rejected() {
    let address = ShippingAddress {
      recipient_phone: "010-1234-abcd".to_string(),
      ..valid_address()
    };
    match address.validate() {
      Err(AppError::Validation(msg)) => assert!(msg.contains("하이픈")),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn short_fields_are_rejected() {
    let short_name = ShippingAddress {
      recipient_name: "김".to_string(),
      ..valid_address()
    };
    assert!(short_name.validate().is_err());

    let short_postal = ShippingAddress {
      postal_code: "062".to_string(),
      ..valid_address()
    };
    assert!(short_postal.validate().is_err());
  }

  #[test]
  fn shipping_address_uses_camel_case_json() {
    let json = serde_json::to_value(valid_address()).unwrap();
    assert_eq!(json["recipientName"], "김철수");
    assert_eq!(json["detailAddress"], "12층");
  }
}
