// storefront/src/orders.rs

use crate::errors::{AppError, Result};
use crate::flows::CreateOrderCtxData;
use crate::models::{Order, OrderStatus, OrderWithItems, ShippingAddress, UserId};
use crate::payment::order_name;
use crate::revalidate::{order_path, CART_PATH, CHECKOUT_PATH, ORDERS_PATH};
use crate::storefront::{flow_incomplete, Storefront};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
  pub shipping_address: ShippingAddress,
  #[serde(default)]
  pub order_note: Option<String>,
}

/// What the checkout page needs to start payment for a freshly created order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
  pub order_id: Uuid,
  pub total_amount: i64,
  pub order_name: String,
}

impl Storefront {
  /// Turns the user's cart into a `pending` order.
  ///
  /// Either the order and all its items exist afterwards, or neither does; when the
  /// rollback itself fails the result is `PartialOrderCreationFailure`. Clearing the
  /// cart is best-effort and never fails the order.
  #[instrument(name = "Storefront::create_order", skip(self, input), fields(user_id = %user))]
  pub async fn create_order(&self, user: &UserId, input: CreateOrderInput) -> Result<PlacedOrder> {
    let data = CreateOrderCtxData::new(self.scope(user), input.shipping_address, input.order_note);
    let ctx = self.run_flow(data).await?;

    let placed = {
      let guard = ctx.read();
      let order = guard.order.as_ref().ok_or_else(|| flow_incomplete("an order"))?;
      let names: Vec<&str> = guard.lines.iter().map(|l| l.product.name.as_str()).collect();
      PlacedOrder {
        order_id: order.id,
        total_amount: order.total_amount,
        order_name: order_name(&names),
      }
    };

    info!(order_id = %placed.order_id, total_amount = placed.total_amount, "Order placed.");
    self.invalidate(&[CART_PATH, CHECKOUT_PATH]);
    Ok(placed)
  }

  /// The user's orders, newest first.
  pub async fn list_orders(&self, user: &UserId) -> Result<Vec<Order>> {
    self.scope(user).list_orders().await
  }

  pub async fn get_order(&self, user: &UserId, order_id: Uuid) -> Result<OrderWithItems> {
    self
      .scope(user)
      .get_order_with_items(order_id)
      .await?
      .ok_or(AppError::OrderNotFound)
  }

  /// Cancels an order that has not been paid yet.
  #[instrument(name = "Storefront::cancel_order", skip(self), fields(user_id = %user))]
  pub async fn cancel_order(&self, user: &UserId, order_id: Uuid) -> Result<Order> {
    let scope = self.scope(user);
    let order = scope.get_order(order_id).await?.ok_or(AppError::OrderNotFound)?;
    order.status.ensure_shopper_transition(OrderStatus::Cancelled)?;

    if scope
      .update_order_status(order_id, OrderStatus::Pending, OrderStatus::Cancelled)
      .await?
      == 0
    {
      let current = scope.get_order(order_id).await?.ok_or(AppError::OrderNotFound)?;
      return Err(AppError::AlreadyProcessed { status: current.status });
    }

    info!(%order_id, "Order cancelled.");
    self.invalidate(&[ORDERS_PATH, &order_path(order_id)]);
    Ok(Order {
      status: OrderStatus::Cancelled,
      ..order
    })
  }
}
