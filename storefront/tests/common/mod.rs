// storefront/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use std::sync::Arc;
use storefront::models::{Product, ProductCategory, ShippingAddress, UserId};
use storefront::orders::CreateOrderInput;
use storefront::revalidate::RecordingInvalidator;
use storefront::store::{MemoryStore, SharedStore};
use storefront::{AppConfig, Storefront};
use tracing::Level;

pub struct Fixture {
  pub store: Arc<MemoryStore>,
  pub shop: Storefront,
  pub views: Arc<RecordingInvalidator>,
}

impl Fixture {
  pub fn new() -> Self {
    Self::with_store(MemoryStore::new())
  }

  pub fn with_store(store: MemoryStore) -> Self {
    setup_tracing();
    let store = Arc::new(store);
    let views = Arc::new(RecordingInvalidator::default());
    let shared: SharedStore = store.clone();
    let shop = Storefront::new(shared, Arc::new(AppConfig::default())).with_invalidator(views.clone());
    Self { store, shop, views }
  }

  pub fn product(&self, name: &str, price: i64, stock: i32) -> Product {
    self.store.add_product(name, price, stock, Some(ProductCategory::Clothing))
  }

  /// Cart `[Shirt 20000 x2, Hat 10000 x1]` for `user`.
  pub async fn shirt_and_hat_cart(&self, user: &UserId) -> (Product, Product) {
    let shirt = self.product("Shirt", 20_000, 10);
    let hat = self.product("Hat", 10_000, 10);
    self.shop.add_item(user, shirt.id, 2).await.unwrap();
    self.shop.add_item(user, hat.id, 1).await.unwrap();
    (shirt, hat)
  }
}

pub fn alice() -> UserId {
  UserId::new("user_alice")
}

pub fn bob() -> UserId {
  UserId::new("user_bob")
}

pub fn valid_address() -> ShippingAddress {
  ShippingAddress {
    postal_code: "06236".to_string(),
    address: "서울특별시 강남구 테헤란로 152".to_string(),
    detail_address: "12층".to_string(),
    recipient_name: "홍길동".to_string(),
    recipient_phone: "010-1234-5678".to_string(),
  }
}

pub fn order_input() -> CreateOrderInput {
  CreateOrderInput {
    shipping_address: valid_address(),
    order_note: None,
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
