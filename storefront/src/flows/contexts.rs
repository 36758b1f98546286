// storefront/src/flows/contexts.rs

//! Data carried through each flow. Handlers receive it wrapped in `FlowContext`.

use crate::models::{CartItem, CartLine, NewOrder, NewOrderItem, Order, OrderItem, Product, ShippingAddress};
use crate::store::UserScope;
use uuid::Uuid;

#[derive(Clone)]
pub struct AddItemCtxData {
  pub scope: UserScope,
  pub product_id: Uuid,
  pub delta_quantity: i32,
  pub product: Option<Product>,
  pub existing: Option<CartItem>,
  pub new_quantity: i32,
  pub cart_item: Option<CartItem>,
}

impl AddItemCtxData {
  pub fn new(scope: UserScope, product_id: Uuid, delta_quantity: i32) -> Self {
    Self {
      scope,
      product_id,
      delta_quantity,
      product: None,
      existing: None,
      new_quantity: 0,
      cart_item: None,
    }
  }
}

#[derive(Clone)]
pub struct CreateOrderCtxData {
  pub scope: UserScope,
  pub shipping_address: ShippingAddress,
  pub order_note: Option<String>,
  pub lines: Vec<CartLine>,
  pub draft: Option<NewOrder>,
  pub draft_items: Vec<NewOrderItem>,
  pub order: Option<Order>,
  pub items: Vec<OrderItem>,
  /// Set once the order's items are stored, by either insert path.
  pub items_written: bool,
}

impl CreateOrderCtxData {
  pub fn new(scope: UserScope, shipping_address: ShippingAddress, order_note: Option<String>) -> Self {
    Self {
      scope,
      shipping_address,
      order_note,
      lines: Vec::new(),
      draft: None,
      draft_items: Vec::new(),
      order: None,
      items: Vec::new(),
      items_written: false,
    }
  }
}

#[derive(Clone)]
pub struct ConfirmPaymentCtxData {
  pub scope: UserScope,
  pub order_id: Uuid,
  /// Amount reported by the payment redirect, if any.
  pub paid_amount: Option<i64>,
  pub order: Option<Order>,
}

impl ConfirmPaymentCtxData {
  pub fn new(scope: UserScope, order_id: Uuid, paid_amount: Option<i64>) -> Self {
    Self {
      scope,
      order_id,
      paid_amount,
      order: None,
    }
  }
}
