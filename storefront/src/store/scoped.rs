// storefront/src/store/scoped.rs

use super::{SharedStore, StorefrontStore};
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems, ShippingAddress, UserId,
};
use uuid::Uuid;

/// A store handle bound to one authenticated user.
///
/// Every cart and order access made through it carries the owner filter, so code
/// holding a `UserScope` cannot read or write another user's rows.
#[derive(Clone)]
pub struct UserScope {
  store: SharedStore,
  user: UserId,
}

pub trait Scoped {
  fn scoped(&self, user: &UserId) -> UserScope;
}

impl Scoped for SharedStore {
  fn scoped(&self, user: &UserId) -> UserScope {
    UserScope {
      store: SharedStore::clone(self),
      user: user.clone(),
    }
  }
}

impl UserScope {
  pub fn user(&self) -> &UserId {
    &self.user
  }

  /// Unscoped access for tables that are not user-owned (products).
  pub fn store(&self) -> &dyn StorefrontStore {
    self.store.as_ref()
  }

  pub async fn find_cart_item(&self, product_id: Uuid) -> Result<Option<CartItem>> {
    self.store.find_cart_item(&self.user, product_id).await
  }

  pub async fn get_cart_item(&self, id: Uuid) -> Result<Option<CartItem>> {
    self.store.get_cart_item(&self.user, id).await
  }

  pub async fn upsert_cart_item(&self, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    self.store.upsert_cart_item(&self.user, product_id, quantity).await
  }

  pub async fn update_cart_item_quantity(&self, id: Uuid, quantity: i32) -> Result<u64> {
    self.store.update_cart_item_quantity(&self.user, id, quantity).await
  }

  pub async fn delete_cart_item(&self, id: Uuid) -> Result<u64> {
    self.store.delete_cart_item(&self.user, id).await
  }

  pub async fn clear_cart(&self) -> Result<u64> {
    self.store.delete_cart_items(&self.user).await
  }

  pub async fn list_cart_items(&self) -> Result<Vec<CartItem>> {
    self.store.list_cart_items(&self.user).await
  }

  /// A new order record owned by this scope's user.
  pub fn new_order(&self, total_amount: i64, shipping_address: ShippingAddress, order_note: Option<String>) -> NewOrder {
    NewOrder {
      id: Uuid::new_v4(),
      user_id: self.user.clone(),
      total_amount,
      shipping_address,
      order_note,
    }
  }

  pub async fn insert_order(&self, order: NewOrder) -> Result<Order> {
    self.ensure_owned(&order)?;
    self.store.insert_order(order).await
  }

  pub async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>> {
    self.store.insert_order_items(items).await
  }

  pub async fn insert_order_atomically(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Option<OrderWithItems>> {
    self.ensure_owned(&order)?;
    self.store.insert_order_atomically(order, items).await
  }

  pub async fn delete_order(&self, id: Uuid) -> Result<u64> {
    self.store.delete_order(&self.user, id).await
  }

  pub async fn get_order(&self, id: Uuid) -> Result<Option<Order>> {
    self.store.get_order(&self.user, id).await
  }

  /// The order with its items, or `None` when the user does not own such an order.
  pub async fn get_order_with_items(&self, id: Uuid) -> Result<Option<OrderWithItems>> {
    let Some(order) = self.store.get_order(&self.user, id).await? else {
      return Ok(None);
    };
    let items = self.store.list_order_items(order.id).await?;
    Ok(Some(OrderWithItems { order, items }))
  }

  pub async fn list_orders(&self) -> Result<Vec<Order>> {
    self.store.list_orders(&self.user).await
  }

  pub async fn update_order_status(&self, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<u64> {
    self.store.update_order_status(&self.user, id, from, to).await
  }

  fn ensure_owned(&self, order: &NewOrder) -> Result<()> {
    if order.user_id != self.user {
      tracing::error!(order_id = %order.id, "Order record owned by another user passed to scoped insert.");
      return Err(AppError::NotAuthenticated);
    }
    Ok(())
  }
}
