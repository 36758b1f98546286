// storefront/src/flows/mod.rs

//! The storefront's multi-step operations, each a `Flow` over its own context type.

use crate::errors::AppError;
use storefront_flow::FlowRegistry;

pub mod add_item;
pub mod confirm_payment;
pub mod contexts;
pub mod create_order;

pub use contexts::{AddItemCtxData, ConfirmPaymentCtxData, CreateOrderCtxData};

/// Registers every storefront flow. Called once when the `Storefront` is built.
pub fn register_all_flows(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering storefront flows...");
  add_item::register_add_item_flow(registry);
  create_order::register_create_order_flow(registry);
  confirm_payment::register_confirm_payment_flow(registry);
  tracing::info!("All storefront flows registered.");
}
