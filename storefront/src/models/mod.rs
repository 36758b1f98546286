// storefront/src/models/mod.rs

//! Rows of the storefront tables and the views built from them.

pub mod cart_item;
pub mod order;
pub mod order_item;
pub mod product;

pub use cart_item::{CartItem, CartLine, CartSummary};
pub use order::{NewOrder, Order, OrderStatus, OrderWithItems, ShippingAddress};
pub use order_item::{NewOrderItem, OrderItem};
pub use product::{Product, ProductCategory, ProductPage, ProductQuery, ProductSort};

use serde::{Deserialize, Serialize};

/// Opaque user identifier issued by the external identity provider.
///
/// Every user-owned row carries one; operations never trust a user id that did not
/// come from the authenticated request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct UserId(String);

impl UserId {
  pub fn new(id: impl Into<String>) -> Self {
    UserId(id.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for UserId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}
