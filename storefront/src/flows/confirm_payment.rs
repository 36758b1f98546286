// storefront/src/flows/confirm_payment.rs

use crate::errors::AppError;
use crate::flows::contexts::ConfirmPaymentCtxData;
use crate::models::OrderStatus;
use storefront_flow::{Flow, FlowContext, FlowRegistry, StepControl};
use tracing::{info, warn};

pub fn build_confirm_payment_flow() -> Flow<ConfirmPaymentCtxData, AppError> {
  let mut f = Flow::<ConfirmPaymentCtxData, AppError>::new(&[
    ("load_order", false, None),
    ("verify_amount", false, None),
    ("guard_pending", false, None),
    ("mark_confirmed", false, None),
  ]);

  f.on("load_order", |ctx_data: FlowContext<ConfirmPaymentCtxData>| {
    Box::pin(async move {
      let (scope, order_id) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.order_id)
      };
      let order = scope.get_order(order_id).await?.ok_or_else(|| {
        warn!(%order_id, user_id = %scope.user(), "Confirm payment flow: order not found for user.");
        AppError::OrderNotFound
      })?;
      ctx_data.write().order = Some(order);
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("verify_amount", |ctx_data: FlowContext<ConfirmPaymentCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let expected = guard.order.as_ref().map(|o| o.total_amount).ok_or(AppError::OrderNotFound)?;
      if let Some(paid) = guard.paid_amount {
        if paid != expected {
          warn!(order_id = %guard.order_id, expected, paid, "Confirm payment flow: paid amount does not match.");
          return Err(AppError::AmountMismatch { expected, paid });
        }
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f.on("guard_pending", |ctx_data: FlowContext<ConfirmPaymentCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let status = guard.order.as_ref().map(|o| o.status).ok_or(AppError::OrderNotFound)?;
      if let Err(e) = status.ensure_shopper_transition(OrderStatus::Confirmed) {
        info!(order_id = %guard.order_id, %status, "Confirm payment flow: order already processed.");
        return Err(e);
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  // The single writer of `confirmed`. A write error is surfaced as-is.
  f.on("mark_confirmed", |ctx_data: FlowContext<ConfirmPaymentCtxData>| {
    Box::pin(async move {
      let (scope, order_id) = {
        let guard = ctx_data.read();
        (guard.scope.clone(), guard.order_id)
      };
      let updated = scope
        .update_order_status(order_id, OrderStatus::Pending, OrderStatus::Confirmed)
        .await?;

      if updated == 0 {
        // Lost a race with another confirmation or a cancellation.
        let current = scope.get_order(order_id).await?.ok_or(AppError::OrderNotFound)?;
        info!(%order_id, status = %current.status, "Confirm payment flow: status changed concurrently.");
        return Err(AppError::AlreadyProcessed { status: current.status });
      }

      info!(%order_id, "Confirm payment flow: order confirmed.");
      if let Some(order) = ctx_data.write().order.as_mut() {
        order.status = OrderStatus::Confirmed;
      }
      Ok::<_, AppError>(StepControl::Continue)
    })
  });

  f
}

pub fn register_confirm_payment_flow(registry: &FlowRegistry<AppError>) {
  registry.register(build_confirm_payment_flow());
  info!("Confirm payment flow registered.");
}
