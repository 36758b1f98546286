// storefront/src/flows/create_order.rs

//! Order creation as a saga: the order row is compensated by deleting it when its
//! items cannot be written.

use crate::cart::load_cart_lines;
use crate::errors::AppError;
use crate::flows::contexts::CreateOrderCtxData;
use crate::models::{cart_item, NewOrderItem};
use std::sync::Arc;
use storefront_flow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{error, info, warn};

pub fn build_create_order_flow() -> Flow<CreateOrderCtxData, AppError> {
  let mut f = Flow::<CreateOrderCtxData, AppError>::new(&[
    ("validate_shipping", false, None),
    ("load_cart", false, None),
    ("snapshot_lines", false, None),
    ("insert_order", false, None),
    (
      "insert_items",
      false,
      Some(Arc::new(|ctx: FlowContext<CreateOrderCtxData>| ctx.read().items_written)),
    ),
    ("clear_cart", true, None),
  ]);

  f.on("validate_shipping", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      guard.shipping_address.validate()?;
      guard.order_note = guard
        .order_note
        .take()
        .map(|note| note.trim().to_string())
        .filter(|note| !note.is_empty());
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("load_cart", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let scope = ctx_data.read().scope.clone();
      let lines = load_cart_lines(&scope).await?;
      if lines.is_empty() {
        warn!(user_id = %scope.user(), "Create order flow: cart is empty.");
        return Err(AppError::EmptyCart);
      }
      ctx_data.write().lines = lines;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // Prices and names are frozen here; later catalog edits never touch the order.
  f.on("snapshot_lines", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let total_amount = cart_item::total_price(&guard.lines)?;
      let draft = guard
        .scope
        .new_order(total_amount, guard.shipping_address.clone(), guard.order_note.clone());
      let draft_items: Vec<NewOrderItem> = guard
        .lines
        .iter()
        .zip(0..)
        .map(|(line, line_no)| NewOrderItem {
          order_id: draft.id,
          line_no,
          product_id: line.product.id,
          product_name: line.product.name.clone(),
          quantity: line.item.quantity,
          price: line.product.price,
        })
        .collect();

      info!(order_id = %draft.id, total_amount, lines = draft_items.len(), "Create order flow: cart snapshot taken.");
      guard.draft = Some(draft);
      guard.draft_items = draft_items;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("insert_order", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let (scope, draft, draft_items) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.draft.clone(), guard.draft_items.clone())
      };
      let draft = draft.ok_or_else(|| AppError::Validation("order snapshot missing".to_string()))?;

      match scope.insert_order_atomically(draft.clone(), draft_items).await? {
        Some(written) => {
          info!(order_id = %written.order.id, "Create order flow: order and items written in one transaction.");
          let mut guard = ctx_data.write();
          guard.order = Some(written.order);
          guard.items = written.items;
          guard.items_written = true;
        }
        None => {
          let order = scope.insert_order(draft).await?;
          info!(order_id = %order.id, "Create order flow: pending order row inserted.");
          ctx_data.write().order = Some(order);
        }
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.compensate("insert_order", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let (scope, order_id) = {
        let guard = ctx_data.read();
        let order_id = guard.order.as_ref().map(|o| o.id).or(guard.draft.as_ref().map(|d| d.id));
        (guard.scope.clone(), order_id)
      };
      let Some(order_id) = order_id else {
        return Ok(());
      };

      match scope.delete_order(order_id).await {
        Ok(deleted) if deleted > 0 => {
          info!(%order_id, "Create order flow: order row removed after failure.");
          Ok(())
        }
        Ok(_) => {
          error!(%order_id, "Create order flow: compensating delete removed no rows.");
          Err(AppError::PartialOrderCreationFailure {
            order_id,
            source: anyhow::anyhow!("compensating delete of order {} removed no rows", order_id),
          })
        }
        Err(e) => {
          error!(%order_id, error = %e, "Create order flow: compensating delete failed.");
          Err(AppError::PartialOrderCreationFailure {
            order_id,
            source: anyhow::Error::new(e),
          })
        }
      }
    })
  });

  f.on("insert_items", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let (scope, draft_items) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.draft_items.clone())
      };
      let items = scope.insert_order_items(draft_items).await?;
      let mut guard = ctx_data.write();
      guard.items = items;
      guard.items_written = true;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // The order already stands at this point; a cart that fails to clear is only stale.
  f.on("clear_cart", |ctx_data: FlowContext<CreateOrderCtxData>| {
    Box::pin(async move {
      let scope = ctx_data.read().scope.clone();
      match scope.clear_cart().await {
        Ok(removed) => {
          info!(user_id = %scope.user(), removed, "Create order flow: cart cleared.");
        }
        Err(e) => {
          warn!(user_id = %scope.user(), error = %e, "Create order flow: failed to clear cart, continuing.");
        }
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f
}

pub fn register_create_order_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_create_order_flow());
  info!("Create order flow registered.");
}
