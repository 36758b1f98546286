// storefront/src/models/order_item.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A frozen copy of one cart line, taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct OrderItem {
  pub id: Uuid,
  pub order_id: Uuid,
  /// Position in the cart snapshot. Items are always listed in this order.
  pub line_no: i32,
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: i32,
  pub price: i64,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
  pub order_id: Uuid,
  pub line_no: i32,
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: i32,
  pub price: i64,
}
