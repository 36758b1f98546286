// storefront/src/store/mod.rs

//! The row-level store the storefront runs against.
//!
//! Backends only offer CRUD with equality filters. Business rules live above this
//! trait; ownership is enforced by always going through a [`UserScope`].

pub mod memory;
pub mod postgres;
pub mod scoped;

pub use memory::{MemoryStore, StoreOp};
pub use postgres::PgStore;
pub use scoped::{Scoped, UserScope};

use crate::errors::Result;
use crate::models::{
  CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems, Product, ProductPage, ProductQuery,
  UserId,
};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub type SharedStore = Arc<dyn StorefrontStore>;

#[async_trait]
pub trait StorefrontStore: Send + Sync {
  // --- products (not user-owned) ---
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>>;
  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
  /// Active products only, filtered, sorted and windowed, with the exact match count.
  async fn query_products(&self, query: &ProductQuery) -> Result<ProductPage>;
  /// Newest active products first.
  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>>;
  /// The category column of every active product.
  async fn active_product_categories(&self) -> Result<Vec<Option<String>>>;

  // --- cart_items, filtered by owner ---
  async fn find_cart_item(&self, user: &UserId, product_id: Uuid) -> Result<Option<CartItem>>;
  async fn get_cart_item(&self, user: &UserId, id: Uuid) -> Result<Option<CartItem>>;
  /// Inserts the (user, product) row or overwrites its quantity.
  async fn upsert_cart_item(&self, user: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem>;
  async fn update_cart_item_quantity(&self, user: &UserId, id: Uuid, quantity: i32) -> Result<u64>;
  async fn delete_cart_item(&self, user: &UserId, id: Uuid) -> Result<u64>;
  async fn delete_cart_items(&self, user: &UserId) -> Result<u64>;
  /// Newest first.
  async fn list_cart_items(&self, user: &UserId) -> Result<Vec<CartItem>>;

  // --- orders / order_items ---
  /// Inserts a `pending` order row.
  async fn insert_order(&self, order: NewOrder) -> Result<Order>;
  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>>;
  async fn delete_order(&self, user: &UserId, id: Uuid) -> Result<u64>;
  async fn get_order(&self, user: &UserId, id: Uuid) -> Result<Option<Order>>;
  /// Newest first.
  async fn list_orders(&self, user: &UserId) -> Result<Vec<Order>>;
  /// Oldest first.
  async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>>;
  /// Sets `to` only where the row is still in `from`. Returns the affected row count.
  async fn update_order_status(&self, user: &UserId, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<u64>;

  /// Writes an order and its items as one unit.
  ///
  /// `Ok(None)` means the backend has no multi-row transactions; callers then fall
  /// back to separate inserts with a compensating delete.
  async fn insert_order_atomically(&self, _order: NewOrder, _items: Vec<NewOrderItem>) -> Result<Option<OrderWithItems>> {
    Ok(None)
  }
}
