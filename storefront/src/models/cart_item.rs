// storefront/src/models/cart_item.rs

use super::{Product, UserId};
use crate::errors::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user's intent to buy `quantity` units. Unique per (user_id, product_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CartItem {
  pub id: Uuid,
  pub user_id: UserId,
  pub product_id: Uuid,
  pub quantity: i32,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// A cart row joined with the product it points to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
  #[serde(flatten)]
  pub item: CartItem,
  pub product: Product,
}

impl CartLine {
  pub fn line_total(&self) -> Result<i64> {
    self
      .product
      .price
      .checked_mul(i64::from(self.item.quantity))
      .ok_or_else(amount_too_large)
  }
}

fn amount_too_large() -> AppError {
  AppError::Validation("주문 금액이 너무 큽니다.".to_string())
}

/// Sum of all line totals. Overflow is a `Validation` error.
pub fn total_price(lines: &[CartLine]) -> Result<i64> {
  lines.iter().try_fold(0i64, |acc, line| {
    acc.checked_add(line.line_total()?).ok_or_else(amount_too_large)
  })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
  pub items: Vec<CartLine>,
  pub total_items: i64,
  pub total_price: i64,
}

impl CartSummary {
  pub fn from_lines(items: Vec<CartLine>) -> Result<Self> {
    let total_items = items.iter().map(|l| i64::from(l.item.quantity)).sum();
    let total_price = total_price(&items)?;
    Ok(Self {
      items,
      total_items,
      total_price,
    })
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(price: i64, quantity: i32) -> CartLine {
    let now = Utc::now();
    let product = Product {
      id: Uuid::new_v4(),
      name: "Shirt".to_string(),
      description: None,
      price,
      category: None,
      stock_quantity: 100,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    CartLine {
      item: CartItem {
        id: Uuid::new_v4(),
        user_id: UserId::new("user_alice"),
        product_id: product.id,
        quantity,
        created_at: now,
        updated_at: now,
      },
      product,
    }
  }

  #[test]
  fn summary_adds_up_lines() {
    let summary = CartSummary::from_lines(vec![line(20_000, 2), line(10_000, 1)]).unwrap();
    assert_eq!(summary.total_items, 3);
    assert_eq!(summary.total_price, 50_000);
  }

  #[test]
  fn line_total_overflow_is_a_validation_error() {
    match line(i64::MAX, 2).line_total() {
      Err(AppError::Validation(msg)) => assert!(msg.contains("금액")),
      other => panic!("expected validation error, got {:?}", other),
    }
  }

  #[test]
  fn summary_overflow_across_lines_is_a_validation_error() {
    let lines = vec![line(i64::MAX / 2 + 1, 1), line(i64::MAX / 2 + 1, 1)];
    assert!(matches!(CartSummary::from_lines(lines), Err(AppError::Validation(_))));
  }
}
