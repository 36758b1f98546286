// storefront/src/flows/add_item.rs

use crate::errors::AppError;
use crate::flows::contexts::AddItemCtxData;
use storefront_flow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{info, warn};

pub fn build_add_item_flow() -> Flow<AddItemCtxData, AppError> {
  let mut f = Flow::<AddItemCtxData, AppError>::new(&[
    ("validate_quantity", false, None),
    ("load_product", false, None),
    ("load_existing", false, None),
    ("check_stock", false, None),
    ("upsert_item", false, None),
  ]);

  f.on("validate_quantity", |ctx_data: FlowContext<AddItemCtxData>| {
    Box::pin(async move {
      let delta = ctx_data.read().delta_quantity;
      if delta <= 0 {
        warn!(delta, "Add item flow: non-positive quantity rejected.");
        return Err(AppError::InvalidQuantity);
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("load_product", |ctx_data: FlowContext<AddItemCtxData>| {
    Box::pin(async move {
      let (scope, product_id) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.product_id)
      };

      let product = scope.store().get_product(product_id).await?.ok_or_else(|| {
        warn!(%product_id, "Add item flow: product not found.");
        AppError::ProductNotFound
      })?;
      if !product.is_active {
        warn!(%product_id, "Add item flow: product is inactive.");
        return Err(AppError::ProductInactive);
      }

      ctx_data.write().product = Some(product);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("load_existing", |ctx_data: FlowContext<AddItemCtxData>| {
    Box::pin(async move {
      let (scope, product_id) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.product_id)
      };
      let existing = scope.find_cart_item(product_id).await?;
      ctx_data.write().existing = existing;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("check_stock", |ctx_data: FlowContext<AddItemCtxData>| {
    Box::pin(async move {
      let mut guard = ctx_data.write();
      let stock = guard
        .product
        .as_ref()
        .map(|p| p.stock_quantity)
        .ok_or(AppError::ProductNotFound)?;
      let delta = guard.delta_quantity;
      let new_quantity = match &guard.existing {
        Some(item) => item.quantity.saturating_add(delta),
        None => delta,
      };

      if new_quantity > stock {
        warn!(
          product_id = %guard.product_id,
          requested = new_quantity,
          available = stock,
          "Add item flow: insufficient stock."
        );
        return Err(AppError::InsufficientStock { available: stock });
      }
      guard.new_quantity = new_quantity;
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("upsert_item", |ctx_data: FlowContext<AddItemCtxData>| {
    Box::pin(async move {
      let (scope, product_id, quantity) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.product_id, guard.new_quantity)
      };
      let item = scope.upsert_cart_item(product_id, quantity).await?;
      info!(
        user_id = %scope.user(),
        %product_id,
        quantity = item.quantity,
        "Add item flow: cart item stored."
      );
      ctx_data.write().cart_item = Some(item);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f
}

pub fn register_add_item_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_add_item_flow());
  info!("Add item flow registered.");
}
