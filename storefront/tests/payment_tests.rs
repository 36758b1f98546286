// storefront/tests/payment_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::models::OrderStatus;
use storefront::orders::PlacedOrder;
use storefront::payment::PaymentFailParams;
use storefront::store::StoreOp;
use storefront::AppError;
use uuid::Uuid;

async fn placed_order(fx: &Fixture) -> PlacedOrder {
  fx.shirt_and_hat_cart(&alice()).await;
  let placed = fx.shop.create_order(&alice(), order_input()).await.unwrap();
  fx.views.take();
  placed
}

#[tokio::test]
#[serial]
async fn test_confirm_moves_pending_to_confirmed_once() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;

  let order = fx.shop.confirm_order(&alice(), placed.order_id, Some(50_000)).await.unwrap();
  assert_eq!(order.status, OrderStatus::Confirmed);
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Confirmed);
  assert_eq!(
    fx.views.take(),
    vec!["/orders".to_string(), format!("/orders/{}", placed.order_id)]
  );

  // A replayed redirect changes nothing.
  let err = fx.shop.confirm_order(&alice(), placed.order_id, Some(50_000)).await.unwrap_err();
  assert!(matches!(err, AppError::AlreadyProcessed { status: OrderStatus::Confirmed }));
  assert!(fx.views.paths().is_empty());
}

#[tokio::test]
#[serial]
async fn test_confirm_without_reported_amount() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;
  let order = fx.shop.confirm_order(&alice(), placed.order_id, None).await.unwrap();
  assert_eq!(order.status, OrderStatus::Confirmed);
}

#[tokio::test]
#[serial]
async fn test_amount_mismatch_leaves_order_pending() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;

  let err = fx.shop.confirm_order(&alice(), placed.order_id, Some(49_999)).await.unwrap_err();
  assert!(matches!(err, AppError::AmountMismatch { expected: 50_000, paid: 49_999 }));
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Pending);
  assert!(!fx.store.calls().contains(&StoreOp::UpdateOrderStatus));
}

#[tokio::test]
#[serial]
async fn test_confirm_unknown_or_foreign_order() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;

  let err = fx.shop.confirm_order(&alice(), Uuid::new_v4(), None).await.unwrap_err();
  assert!(matches!(err, AppError::OrderNotFound));
  let err = fx.shop.confirm_order(&bob(), placed.order_id, Some(50_000)).await.unwrap_err();
  assert!(matches!(err, AppError::OrderNotFound));
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Pending);
}

#[tokio::test]
#[serial]
async fn test_cancelled_order_cannot_be_confirmed() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;
  fx.shop.cancel_order(&alice(), placed.order_id).await.unwrap();

  let err = fx.shop.confirm_order(&alice(), placed.order_id, Some(50_000)).await.unwrap_err();
  assert!(matches!(err, AppError::AlreadyProcessed { status: OrderStatus::Cancelled }));
}

#[tokio::test]
#[serial]
async fn test_status_write_failure_is_surfaced_not_retried() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;
  fx.store.fail_on(StoreOp::UpdateOrderStatus);

  let err = fx.shop.confirm_order(&alice(), placed.order_id, Some(50_000)).await.unwrap_err();
  assert!(matches!(err, AppError::StoreUnavailable { .. }));
  let attempts = fx
    .store
    .calls()
    .into_iter()
    .filter(|op| *op == StoreOp::UpdateOrderStatus)
    .count();
  assert_eq!(attempts, 1);
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Pending);
}

#[tokio::test]
#[serial]
async fn test_concurrent_confirmations_confirm_once() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;

  let (user_a, user_b) = (alice(), alice());
  let (a, b) = tokio::join!(
    fx.shop.confirm_order(&user_a, placed.order_id, Some(50_000)),
    fx.shop.confirm_order(&user_b, placed.order_id, Some(50_000))
  );

  let confirmed = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
  assert_eq!(confirmed, 1);
  let rejected = if a.is_err() { a.unwrap_err() } else { b.unwrap_err() };
  assert!(matches!(rejected, AppError::AlreadyProcessed { status: OrderStatus::Confirmed }));
}

#[tokio::test]
#[serial]
async fn test_payment_request_for_placed_order() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;

  let request = fx.shop.payment_request(&alice(), placed.order_id, None).await.unwrap();
  assert_eq!(request.amount, 50_000);
  assert_eq!(request.customer_name, "고객");
  assert_eq!(request.order_name, "Hat 외 1개");
  assert_eq!(request.success_url, "http://127.0.0.1:8080/api/v1/payments/success");
  assert_eq!(request.fail_url, "http://127.0.0.1:8080/api/v1/payments/fail");

  let named = fx.shop.payment_request(&alice(), placed.order_id, Some("홍길동")).await.unwrap();
  assert_eq!(named.customer_name, "홍길동");
}

#[tokio::test]
#[serial]
async fn test_payment_failure_cancels_pending_order() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;
  let params = PaymentFailParams {
    code: Some("PAY_PROCESS_CANCELED".to_string()),
    message: Some("사용자에 의해 결제가 취소되었습니다.".to_string()),
    order_id: Some(placed.order_id.to_string()),
  };

  let message = fx.shop.record_payment_failure(&alice(), &params).await.unwrap();
  assert_eq!(message, "사용자에 의해 결제가 취소되었습니다. (코드: PAY_PROCESS_CANCELED)");
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Cancelled);
}

#[tokio::test]
#[serial]
async fn test_payment_failure_leaves_confirmed_order_alone() {
  let fx = Fixture::new();
  let placed = placed_order(&fx).await;
  fx.shop.confirm_order(&alice(), placed.order_id, Some(50_000)).await.unwrap();
  let params = PaymentFailParams {
    code: Some("confirm_failed".to_string()),
    message: None,
    order_id: Some(placed.order_id.to_string()),
  };

  let message = fx.shop.record_payment_failure(&alice(), &params).await.unwrap();
  assert_eq!(message, "주문 확인에 실패했습니다. (코드: confirm_failed)");
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Confirmed);

  // Another user's failure redirect cannot cancel this order either.
  let foreign = PaymentFailParams {
    order_id: Some(placed.order_id.to_string()),
    ..Default::default()
  };
  fx.shop.record_payment_failure(&bob(), &foreign).await.unwrap();
  assert_eq!(fx.store.all_orders()[0].status, OrderStatus::Confirmed);
}

#[tokio::test]
#[serial]
async fn test_payment_failure_without_order_id_touches_nothing() {
  let fx = Fixture::new();
  placed_order(&fx).await;
  let before = fx.store.calls().len();

  let message = fx
    .shop
    .record_payment_failure(&alice(), &PaymentFailParams::default())
    .await
    .unwrap();
  assert_eq!(message, "결제에 실패했습니다.");
  assert_eq!(fx.store.calls().len(), before);
}
