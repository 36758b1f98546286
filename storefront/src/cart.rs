// storefront/src/cart.rs

//! Cart operations. All of them act on the authenticated user's own rows only.

use crate::errors::{AppError, Result};
use crate::flows::AddItemCtxData;
use crate::models::{CartItem, CartLine, CartSummary, Product, UserId};
use crate::revalidate::{CART_PATH, PRODUCTS_PATH};
use crate::storefront::{flow_incomplete, Storefront};
use crate::store::UserScope;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

impl Storefront {
  /// Adds `quantity` units of a product, merging into an existing line.
  ///
  /// Stock is checked against the merged quantity, but nothing is reserved: two
  /// concurrent adds can each pass the check.
  #[instrument(name = "Storefront::add_item", skip(self), fields(user_id = %user))]
  pub async fn add_item(&self, user: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    let ctx = self
      .run_flow(AddItemCtxData::new(self.scope(user), product_id, quantity))
      .await?;
    let item = ctx.read().cart_item.clone().ok_or_else(|| flow_incomplete("a cart item"))?;
    self.invalidate(&[CART_PATH, PRODUCTS_PATH]);
    Ok(item)
  }

  /// Overwrites the quantity of one of the user's cart lines.
  #[instrument(name = "Storefront::set_quantity", skip(self), fields(user_id = %user))]
  pub async fn set_quantity(&self, user: &UserId, cart_item_id: Uuid, quantity: i32) -> Result<()> {
    if quantity <= 0 {
      return Err(AppError::InvalidQuantity);
    }
    let scope = self.scope(user);
    let item = scope.get_cart_item(cart_item_id).await?.ok_or(AppError::NotFound)?;
    let product = scope
      .store()
      .get_product(item.product_id)
      .await?
      .ok_or(AppError::ProductNotFound)?;

    if quantity > product.stock_quantity {
      warn!(%cart_item_id, quantity, available = product.stock_quantity, "Quantity exceeds stock.");
      return Err(AppError::InsufficientStock {
        available: product.stock_quantity,
      });
    }

    if scope.update_cart_item_quantity(cart_item_id, quantity).await? == 0 {
      // Removed between the read and the write.
      return Err(AppError::NotFound);
    }
    self.invalidate(&[CART_PATH]);
    Ok(())
  }

  /// Deletes one line. Removing a line that is already gone succeeds.
  #[instrument(name = "Storefront::remove_item", skip(self), fields(user_id = %user))]
  pub async fn remove_item(&self, user: &UserId, cart_item_id: Uuid) -> Result<()> {
    let removed = self.scope(user).delete_cart_item(cart_item_id).await?;
    debug!(removed, "Cart item delete finished.");
    self.invalidate(&[CART_PATH]);
    Ok(())
  }

  #[instrument(name = "Storefront::clear_cart", skip(self), fields(user_id = %user))]
  pub async fn clear_cart(&self, user: &UserId) -> Result<()> {
    let removed = self.scope(user).clear_cart().await?;
    info!(removed, "Cart cleared.");
    self.invalidate(&[CART_PATH]);
    Ok(())
  }

  /// The cart joined with current product data, newest line first.
  pub async fn summarize(&self, user: &UserId) -> Result<CartSummary> {
    let lines = load_cart_lines(&self.scope(user)).await?;
    CartSummary::from_lines(lines)
  }

  /// Total units in the cart, for the cart badge.
  pub async fn item_count(&self, user: &UserId) -> Result<i64> {
    let items = self.scope(user).list_cart_items().await?;
    Ok(items.iter().map(|i| i64::from(i.quantity)).sum())
  }
}

/// Cart rows joined with their products. Rows whose product no longer exists are dropped.
pub(crate) async fn load_cart_lines(scope: &UserScope) -> Result<Vec<CartLine>> {
  let items = scope.list_cart_items().await?;
  if items.is_empty() {
    return Ok(Vec::new());
  }

  let product_ids: Vec<Uuid> = items.iter().map(|i| i.product_id).collect();
  let products: HashMap<Uuid, Product> = scope
    .store()
    .get_products(&product_ids)
    .await?
    .into_iter()
    .map(|p| (p.id, p))
    .collect();

  Ok(
    items
      .into_iter()
      .filter_map(|item| match products.get(&item.product_id) {
        Some(product) => Some(CartLine {
          product: product.clone(),
          item,
        }),
        None => {
          debug!(cart_item_id = %item.id, product_id = %item.product_id, "Cart line without product omitted.");
          None
        }
      })
      .collect(),
  )
}
