// storefront/tests/catalog_tests.rs
mod common;

use common::*;
use serial_test::serial;
use storefront::catalog::{ProductListParams, UNCATEGORIZED};
use storefront::models::{ProductCategory, ProductSort};
use storefront::AppError;

#[tokio::test]
#[serial]
async fn test_listing_pages_through_active_products() {
  let fx = Fixture::new();
  for i in 0..5 {
    fx.product(&format!("Tee {}", i), 10_000 + i, 5);
  }
  let hidden = fx.product("Hidden", 1, 5);
  fx.store.set_product_active(hidden.id, false);

  let params = ProductListParams {
    page: Some(2),
    limit: Some(2),
    sort: Some(ProductSort::PriceAsc),
    ..Default::default()
  };
  let page = fx.shop.list_products(&params).await.unwrap();
  assert_eq!(page.total, 5);
  assert_eq!(page.page, 2);
  assert_eq!(page.total_pages, 3);
  let prices: Vec<i64> = page.products.iter().map(|p| p.price).collect();
  assert_eq!(prices, vec![10_002, 10_003]);
}

#[tokio::test]
#[serial]
async fn test_listing_filters_by_category() {
  let fx = Fixture::new();
  fx.store.seed_demo_catalog();

  let params = ProductListParams {
    category: Some("electronics".to_string()),
    ..Default::default()
  };
  let page = fx.shop.list_products(&params).await.unwrap();
  assert_eq!(page.total, 2);
  assert!(page
    .products
    .iter()
    .all(|p| p.category.as_deref() == Some(ProductCategory::Electronics.as_str())));
}

#[tokio::test]
#[serial]
async fn test_product_detail_hides_inactive_products() {
  let fx = Fixture::new();
  let mug = fx.product("Mug", 8_000, 3);
  assert_eq!(fx.shop.get_product(mug.id).await.unwrap().name, "Mug");

  fx.store.set_product_active(mug.id, false);
  assert!(matches!(fx.shop.get_product(mug.id).await, Err(AppError::ProductNotFound)));
}

#[tokio::test]
#[serial]
async fn test_featured_products_are_newest_first() {
  let fx = Fixture::new();
  fx.product("Old", 1_000, 1);
  fx.product("Middle", 1_000, 1);
  fx.product("New", 1_000, 1);

  let names: Vec<String> = fx
    .shop
    .featured_products(Some(2))
    .await
    .unwrap()
    .into_iter()
    .map(|p| p.name)
    .collect();
  assert_eq!(names, vec!["New", "Middle"]);
  // Falls back to the configured limit.
  assert_eq!(fx.shop.featured_products(None).await.unwrap().len(), 3);
}

#[tokio::test]
#[serial]
async fn test_category_counts_include_uncategorized() {
  let fx = Fixture::new();
  fx.store.seed_demo_catalog();

  let counts = fx.shop.product_counts_by_category().await.unwrap();
  assert_eq!(counts.get("electronics"), Some(&2));
  assert_eq!(counts.get("clothing"), Some(&2));
  assert_eq!(counts.get(UNCATEGORIZED), Some(&1));
  assert_eq!(counts.values().sum::<i64>(), 10);
}
