// storefront/tests/cart_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::store::StoreOp;
use storefront::AppError;
use uuid::Uuid;

#[tokio::test]
#[serial]
async fn test_add_item_up_to_stock_boundary() {
  let fx = Fixture::new();
  let user = alice();
  let mug = fx.product("Mug", 8_000, 3);

  let item = fx.shop.add_item(&user, mug.id, 3).await.unwrap();
  assert_eq!(item.quantity, 3);

  let err = fx.shop.add_item(&user, mug.id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::InsufficientStock { available: 3 }));
  assert_eq!(fx.store.all_cart_items()[0].quantity, 3);
}

#[tokio::test]
#[serial]
async fn test_add_item_merges_into_existing_line() {
  let fx = Fixture::new();
  let user = alice();
  let mug = fx.product("Mug", 8_000, 10);

  let first = fx.shop.add_item(&user, mug.id, 2).await.unwrap();
  let second = fx.shop.add_item(&user, mug.id, 3).await.unwrap();

  assert_eq!(first.id, second.id);
  assert_eq!(second.quantity, 5);
  assert_eq!(fx.store.all_cart_items().len(), 1);
  assert_eq!(fx.views.take(), vec!["/cart", "/products", "/cart", "/products"]);
}

#[tokio::test]
#[serial]
async fn test_add_item_rejects_non_positive_quantity_before_touching_the_store() {
  let fx = Fixture::new();
  let mug = fx.product("Mug", 8_000, 10);

  for quantity in [0, -1] {
    let err = fx.shop.add_item(&alice(), mug.id, quantity).await.unwrap_err();
    assert!(matches!(err, AppError::InvalidQuantity));
  }
  assert!(fx.store.calls().is_empty());
  assert!(fx.views.paths().is_empty());
}

#[tokio::test]
#[serial]
async fn test_add_item_unknown_or_inactive_product() {
  let fx = Fixture::new();
  let err = fx.shop.add_item(&alice(), Uuid::new_v4(), 1).await.unwrap_err();
  assert!(matches!(err, AppError::ProductNotFound));

  let retired = fx.product("Retired", 1_000, 5);
  fx.store.set_product_active(retired.id, false);
  let err = fx.shop.add_item(&alice(), retired.id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::ProductInactive));
  assert!(fx.store.all_cart_items().is_empty());
}

#[tokio::test]
#[serial]
async fn test_store_failure_surfaces_as_store_unavailable() {
  let fx = Fixture::new();
  let mug = fx.product("Mug", 8_000, 10);
  fx.store.fail_on(StoreOp::UpsertCartItem);

  let err = fx.shop.add_item(&alice(), mug.id, 1).await.unwrap_err();
  assert!(matches!(err, AppError::StoreUnavailable { .. }));
  assert!(err.is_incident());
  assert!(fx.views.paths().is_empty());
}

#[tokio::test]
#[serial]
async fn test_set_quantity_checks_stock_and_ownership() {
  let fx = Fixture::new();
  let user = alice();
  let mug = fx.product("Mug", 8_000, 4);
  let item = fx.shop.add_item(&user, mug.id, 1).await.unwrap();

  fx.shop.set_quantity(&user, item.id, 4).await.unwrap();
  assert_eq!(fx.store.all_cart_items()[0].quantity, 4);

  let err = fx.shop.set_quantity(&user, item.id, 5).await.unwrap_err();
  assert!(matches!(err, AppError::InsufficientStock { available: 4 }));

  let err = fx.shop.set_quantity(&user, item.id, 0).await.unwrap_err();
  assert!(matches!(err, AppError::InvalidQuantity));

  // Another user's id for the same row is a miss, not a write.
  let err = fx.shop.set_quantity(&bob(), item.id, 2).await.unwrap_err();
  assert!(matches!(err, AppError::NotFound));
  assert_eq!(fx.store.all_cart_items()[0].quantity, 4);
}

#[tokio::test]
#[serial]
async fn test_set_quantity_rejects_non_positive_quantity_for_any_row() {
  let fx = Fixture::new();
  let mug = fx.product("Mug", 8_000, 4);
  let item = fx.shop.add_item(&alice(), mug.id, 3).await.unwrap();
  let cart_before = fx.store.all_cart_items();
  let calls_before = fx.store.calls().len();
  fx.views.take();

  let cases = [
    (alice(), item.id, -1),
    (alice(), item.id, i32::MIN),
    (alice(), Uuid::new_v4(), 0),
    (alice(), Uuid::new_v4(), -5),
    (bob(), item.id, 0),
    (bob(), item.id, -1),
  ];
  for (user, cart_item_id, quantity) in cases {
    let err = fx.shop.set_quantity(&user, cart_item_id, quantity).await.unwrap_err();
    assert!(
      matches!(err, AppError::InvalidQuantity),
      "quantity {} on {} gave {:?}",
      quantity,
      cart_item_id,
      err
    );
  }

  assert_eq!(fx.store.all_cart_items(), cart_before);
  assert_eq!(fx.store.calls().len(), calls_before);
  assert!(fx.views.take().is_empty());
}

#[tokio::test]
#[serial]
async fn test_remove_item_is_idempotent_and_scoped() {
  let fx = Fixture::new();
  let user = alice();
  let mug = fx.product("Mug", 8_000, 4);
  let item = fx.shop.add_item(&user, mug.id, 1).await.unwrap();

  fx.shop.remove_item(&bob(), item.id).await.unwrap();
  assert_eq!(fx.store.all_cart_items().len(), 1);

  fx.shop.remove_item(&user, item.id).await.unwrap();
  fx.shop.remove_item(&user, item.id).await.unwrap();
  assert!(fx.store.all_cart_items().is_empty());
}

#[tokio::test]
#[serial]
async fn test_summary_totals_and_item_count() {
  let fx = Fixture::new();
  let user = alice();
  fx.shirt_and_hat_cart(&user).await;

  let summary = fx.shop.summarize(&user).await.unwrap();
  assert_eq!(summary.total_items, 3);
  assert_eq!(summary.total_price, 50_000);
  // Newest line first.
  let names: Vec<&str> = summary.items.iter().map(|l| l.product.name.as_str()).collect();
  assert_eq!(names, vec!["Hat", "Shirt"]);

  assert_eq!(fx.shop.item_count(&user).await.unwrap(), 3);
  assert!(fx.shop.summarize(&bob()).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_summary_omits_lines_whose_product_was_removed() {
  let fx = Fixture::new();
  let user = alice();
  let (shirt, _hat) = fx.shirt_and_hat_cart(&user).await;
  fx.store.remove_product(shirt.id);

  let summary = fx.shop.summarize(&user).await.unwrap();
  assert_eq!(summary.items.len(), 1);
  assert_eq!(summary.total_price, 10_000);
  // The row itself stays; only the view drops it.
  assert_eq!(fx.store.all_cart_items().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_clear_cart_only_touches_own_rows() {
  let fx = Fixture::new();
  let mug = fx.product("Mug", 8_000, 10);
  fx.shop.add_item(&alice(), mug.id, 1).await.unwrap();
  fx.shop.add_item(&bob(), mug.id, 2).await.unwrap();

  fx.shop.clear_cart(&alice()).await.unwrap();
  let remaining = fx.store.all_cart_items();
  assert_eq!(remaining.len(), 1);
  assert_eq!(remaining[0].user_id, bob());
}

// Stock is checked per cart and never reserved. These two tests pin down that
// behavior; they do not assert any safety the store does not provide.

#[tokio::test]
#[serial]
async fn test_concurrent_adds_both_pass_the_stock_check() {
  let fx = Fixture::new();
  let user = alice();
  let last_one = fx.product("Last One", 99_000, 1);

  let (a, b) = tokio::join!(
    fx.shop.add_item(&user, last_one.id, 1),
    fx.shop.add_item(&user, last_one.id, 1)
  );

  // Both saw an empty cart, both passed, and the second write overwrote the first.
  assert!(a.is_ok());
  assert!(b.is_ok());
  let items = fx.store.all_cart_items();
  assert_eq!(items.len(), 1);
  assert_eq!(items[0].quantity, 1);
}

#[tokio::test]
#[serial]
async fn test_two_carts_can_hold_the_last_unit() {
  let fx = Fixture::new();
  let last_one = fx.product("Last One", 99_000, 1);

  fx.shop.add_item(&alice(), last_one.id, 1).await.unwrap();
  fx.shop.add_item(&bob(), last_one.id, 1).await.unwrap();
  fx.shop.create_order(&alice(), order_input()).await.unwrap();
  fx.shop.create_order(&bob(), order_input()).await.unwrap();

  assert_eq!(fx.store.all_orders().len(), 2);
}
