// storefront/src/store/memory.rs

//! In-process backend used by tests and by the server when no database is configured.

use super::StorefrontStore;
use crate::errors::{AppError, Result};
use crate::models::{
  CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems, Product, ProductCategory, ProductPage,
  ProductQuery, ProductSort, UserId,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashSet;
use uuid::Uuid;

/// Store calls, for failure injection and call inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
  GetProduct,
  GetProducts,
  QueryProducts,
  FeaturedProducts,
  ActiveProductCategories,
  FindCartItem,
  GetCartItem,
  UpsertCartItem,
  UpdateCartItemQuantity,
  DeleteCartItem,
  DeleteCartItems,
  ListCartItems,
  InsertOrder,
  InsertOrderItems,
  DeleteOrder,
  GetOrder,
  ListOrders,
  ListOrderItems,
  UpdateOrderStatus,
  InsertOrderAtomically,
}

#[derive(Default)]
struct Tables {
  products: Vec<Product>,
  cart_items: Vec<CartItem>,
  orders: Vec<Order>,
  order_items: Vec<OrderItem>,
  failing: HashSet<StoreOp>,
  calls: Vec<StoreOp>,
  // Strictly increasing so "newest first" never depends on clock resolution.
  clock: Option<DateTime<Utc>>,
}

impl Tables {
  fn tick(&mut self) -> DateTime<Utc> {
    let next = match self.clock {
      Some(last) => last + Duration::milliseconds(1),
      None => Utc::now(),
    };
    self.clock = Some(next);
    next
  }
}

/// Tables behind a `parking_lot::Mutex`, with one await point per call.
///
/// The lock is never held across that await, so concurrent operations interleave
/// between store calls the way they would against a remote database.
#[derive(Default)]
pub struct MemoryStore {
  tables: Mutex<Tables>,
  atomic_orders: bool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store whose `insert_order_atomically` writes order and items together.
  pub fn with_atomic_orders() -> Self {
    Self {
      atomic_orders: true,
      ..Self::default()
    }
  }

  /// Makes every later call of `op` fail with `StoreUnavailable`.
  pub fn fail_on(&self, op: StoreOp) {
    self.tables.lock().failing.insert(op);
  }

  pub fn calls(&self) -> Vec<StoreOp> {
    self.tables.lock().calls.clone()
  }

  pub fn add_product(&self, name: &str, price: i64, stock_quantity: i32, category: Option<ProductCategory>) -> Product {
    let mut tables = self.tables.lock();
    let now = tables.tick();
    let product = Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: None,
      price,
      category: category.map(|c| c.as_str().to_string()),
      stock_quantity,
      is_active: true,
      created_at: now,
      updated_at: now,
    };
    tables.products.push(product.clone());
    product
  }

  pub fn set_product_active(&self, id: Uuid, is_active: bool) {
    self.edit_product(id, |p| p.is_active = is_active);
  }

  pub fn set_stock(&self, id: Uuid, stock_quantity: i32) {
    self.edit_product(id, |p| p.stock_quantity = stock_quantity);
  }

  pub fn remove_product(&self, id: Uuid) {
    self.tables.lock().products.retain(|p| p.id != id);
  }

  /// Writes a status directly, the way an operator or shipping system would.
  pub fn force_order_status(&self, id: Uuid, status: OrderStatus) {
    let mut tables = self.tables.lock();
    let now = tables.tick();
    if let Some(order) = tables.orders.iter_mut().find(|o| o.id == id) {
      order.status = status;
      order.updated_at = now;
    }
  }

  pub fn all_orders(&self) -> Vec<Order> {
    self.tables.lock().orders.clone()
  }

  pub fn all_order_items(&self) -> Vec<OrderItem> {
    self.tables.lock().order_items.clone()
  }

  pub fn all_cart_items(&self) -> Vec<CartItem> {
    self.tables.lock().cart_items.clone()
  }

  /// A small catalog across several categories, one product without a category.
  pub fn seed_demo_catalog(&self) -> Vec<Product> {
    let demo: [(&str, i64, i32, Option<ProductCategory>); 10] = [
      ("무선 이어폰", 89_000, 25, Some(ProductCategory::Electronics)),
      ("스마트 워치", 249_000, 10, Some(ProductCategory::Electronics)),
      ("오버핏 셔츠", 39_000, 40, Some(ProductCategory::Clothing)),
      ("버킷 햇", 25_000, 30, Some(ProductCategory::Clothing)),
      ("러스트 프로그래밍", 42_000, 15, Some(ProductCategory::Books)),
      ("유기농 그래놀라", 12_900, 60, Some(ProductCategory::Food)),
      ("요가 매트", 33_000, 20, Some(ProductCategory::Sports)),
      ("수분 크림", 28_000, 35, Some(ProductCategory::Beauty)),
      ("아로마 캔들", 18_000, 50, Some(ProductCategory::Home)),
      ("기프트 카드", 50_000, 100, None),
    ];
    demo
      .into_iter()
      .map(|(name, price, stock, category)| self.add_product(name, price, stock, category))
      .collect()
  }

  fn edit_product(&self, id: Uuid, edit: impl FnOnce(&mut Product)) {
    let mut tables = self.tables.lock();
    let now = tables.tick();
    if let Some(product) = tables.products.iter_mut().find(|p| p.id == id) {
      edit(product);
      product.updated_at = now;
    }
  }

  async fn enter(&self, op: StoreOp) -> Result<()> {
    tokio::task::yield_now().await;
    let mut tables = self.tables.lock();
    tables.calls.push(op);
    if tables.failing.contains(&op) {
      tracing::debug!(?op, "Injected store failure.");
      return Err(AppError::store(anyhow::anyhow!("injected failure on {:?}", op)));
    }
    Ok(())
  }

  fn write_order(tables: &mut Tables, order: NewOrder) -> Order {
    let now = tables.tick();
    let order = Order {
      id: order.id,
      user_id: order.user_id,
      total_amount: order.total_amount,
      status: OrderStatus::Pending,
      shipping_address: order.shipping_address,
      order_note: order.order_note,
      created_at: now,
      updated_at: now,
    };
    tables.orders.push(order.clone());
    order
  }

  fn write_order_items(tables: &mut Tables, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>> {
    if let Some(orphan) = items.iter().find(|i| !tables.orders.iter().any(|o| o.id == i.order_id)) {
      return Err(AppError::store(anyhow::anyhow!(
        "order_items.order_id references missing order {}",
        orphan.order_id
      )));
    }
    let now = tables.tick();
    let written: Vec<OrderItem> = items
      .into_iter()
      .map(|i| OrderItem {
        id: Uuid::new_v4(),
        order_id: i.order_id,
        line_no: i.line_no,
        product_id: i.product_id,
        product_name: i.product_name,
        quantity: i.quantity,
        price: i.price,
        created_at: now,
      })
      .collect();
    tables.order_items.extend(written.iter().cloned());
    Ok(written)
  }
}

#[async_trait]
impl StorefrontStore for MemoryStore {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    self.enter(StoreOp::GetProduct).await?;
    Ok(self.tables.lock().products.iter().find(|p| p.id == id).cloned())
  }

  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    self.enter(StoreOp::GetProducts).await?;
    let tables = self.tables.lock();
    Ok(tables.products.iter().filter(|p| ids.contains(&p.id)).cloned().collect())
  }

  async fn query_products(&self, query: &ProductQuery) -> Result<ProductPage> {
    self.enter(StoreOp::QueryProducts).await?;
    let tables = self.tables.lock();
    let category = query.category.map(|c| c.as_str());
    let mut matching: Vec<Product> = tables
      .products
      .iter()
      .filter(|p| p.is_active && (category.is_none() || p.category.as_deref() == category))
      .cloned()
      .collect();

    match query.sort {
      ProductSort::PriceAsc => matching.sort_by(|a, b| a.price.cmp(&b.price).then(b.created_at.cmp(&a.created_at))),
      ProductSort::PriceDesc => matching.sort_by(|a, b| b.price.cmp(&a.price).then(b.created_at.cmp(&a.created_at))),
      ProductSort::CreatedDesc => matching.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
      ProductSort::NameAsc => matching.sort_by(|a, b| a.name.cmp(&b.name)),
    }

    let total = matching.len() as i64;
    let products = matching
      .into_iter()
      .skip(query.offset.max(0) as usize)
      .take(query.limit.max(0) as usize)
      .collect();
    Ok(ProductPage { products, total })
  }

  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>> {
    self.enter(StoreOp::FeaturedProducts).await?;
    let tables = self.tables.lock();
    let mut active: Vec<Product> = tables.products.iter().filter(|p| p.is_active).cloned().collect();
    active.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    active.truncate(limit.max(0) as usize);
    Ok(active)
  }

  async fn active_product_categories(&self) -> Result<Vec<Option<String>>> {
    self.enter(StoreOp::ActiveProductCategories).await?;
    let tables = self.tables.lock();
    Ok(tables.products.iter().filter(|p| p.is_active).map(|p| p.category.clone()).collect())
  }

  async fn find_cart_item(&self, user: &UserId, product_id: Uuid) -> Result<Option<CartItem>> {
    self.enter(StoreOp::FindCartItem).await?;
    let tables = self.tables.lock();
    Ok(
      tables
        .cart_items
        .iter()
        .find(|c| &c.user_id == user && c.product_id == product_id)
        .cloned(),
    )
  }

  async fn get_cart_item(&self, user: &UserId, id: Uuid) -> Result<Option<CartItem>> {
    self.enter(StoreOp::GetCartItem).await?;
    let tables = self.tables.lock();
    Ok(tables.cart_items.iter().find(|c| &c.user_id == user && c.id == id).cloned())
  }

  async fn upsert_cart_item(&self, user: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    self.enter(StoreOp::UpsertCartItem).await?;
    let mut tables = self.tables.lock();
    let now = tables.tick();
    if let Some(existing) = tables
      .cart_items
      .iter_mut()
      .find(|c| &c.user_id == user && c.product_id == product_id)
    {
      existing.quantity = quantity;
      existing.updated_at = now;
      return Ok(existing.clone());
    }
    let item = CartItem {
      id: Uuid::new_v4(),
      user_id: user.clone(),
      product_id,
      quantity,
      created_at: now,
      updated_at: now,
    };
    tables.cart_items.push(item.clone());
    Ok(item)
  }

  async fn update_cart_item_quantity(&self, user: &UserId, id: Uuid, quantity: i32) -> Result<u64> {
    self.enter(StoreOp::UpdateCartItemQuantity).await?;
    let mut tables = self.tables.lock();
    let now = tables.tick();
    match tables.cart_items.iter_mut().find(|c| &c.user_id == user && c.id == id) {
      Some(item) => {
        item.quantity = quantity;
        item.updated_at = now;
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn delete_cart_item(&self, user: &UserId, id: Uuid) -> Result<u64> {
    self.enter(StoreOp::DeleteCartItem).await?;
    let mut tables = self.tables.lock();
    let before = tables.cart_items.len();
    tables.cart_items.retain(|c| !(&c.user_id == user && c.id == id));
    Ok((before - tables.cart_items.len()) as u64)
  }

  async fn delete_cart_items(&self, user: &UserId) -> Result<u64> {
    self.enter(StoreOp::DeleteCartItems).await?;
    let mut tables = self.tables.lock();
    let before = tables.cart_items.len();
    tables.cart_items.retain(|c| &c.user_id != user);
    Ok((before - tables.cart_items.len()) as u64)
  }

  async fn list_cart_items(&self, user: &UserId) -> Result<Vec<CartItem>> {
    self.enter(StoreOp::ListCartItems).await?;
    let tables = self.tables.lock();
    let mut items: Vec<CartItem> = tables.cart_items.iter().filter(|c| &c.user_id == user).cloned().collect();
    items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(items)
  }

  async fn insert_order(&self, order: NewOrder) -> Result<Order> {
    self.enter(StoreOp::InsertOrder).await?;
    let mut tables = self.tables.lock();
    Ok(Self::write_order(&mut tables, order))
  }

  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>> {
    self.enter(StoreOp::InsertOrderItems).await?;
    let mut tables = self.tables.lock();
    Self::write_order_items(&mut tables, items)
  }

  async fn delete_order(&self, user: &UserId, id: Uuid) -> Result<u64> {
    self.enter(StoreOp::DeleteOrder).await?;
    let mut tables = self.tables.lock();
    let before = tables.orders.len();
    tables.orders.retain(|o| !(&o.user_id == user && o.id == id));
    let removed = (before - tables.orders.len()) as u64;
    if removed > 0 {
      tables.order_items.retain(|i| i.order_id != id);
    }
    Ok(removed)
  }

  async fn get_order(&self, user: &UserId, id: Uuid) -> Result<Option<Order>> {
    self.enter(StoreOp::GetOrder).await?;
    let tables = self.tables.lock();
    Ok(tables.orders.iter().find(|o| &o.user_id == user && o.id == id).cloned())
  }

  async fn list_orders(&self, user: &UserId) -> Result<Vec<Order>> {
    self.enter(StoreOp::ListOrders).await?;
    let tables = self.tables.lock();
    let mut orders: Vec<Order> = tables.orders.iter().filter(|o| &o.user_id == user).cloned().collect();
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(orders)
  }

  async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    self.enter(StoreOp::ListOrderItems).await?;
    let tables = self.tables.lock();
    let mut items: Vec<OrderItem> = tables.order_items.iter().filter(|i| i.order_id == order_id).cloned().collect();
    items.sort_by_key(|i| i.line_no);
    Ok(items)
  }

  async fn update_order_status(&self, user: &UserId, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<u64> {
    self.enter(StoreOp::UpdateOrderStatus).await?;
    let mut tables = self.tables.lock();
    let now = tables.tick();
    match tables
      .orders
      .iter_mut()
      .find(|o| &o.user_id == user && o.id == id && o.status == from)
    {
      Some(order) => {
        order.status = to;
        order.updated_at = now;
        Ok(1)
      }
      None => Ok(0),
    }
  }

  async fn insert_order_atomically(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Option<OrderWithItems>> {
    if !self.atomic_orders {
      return Ok(None);
    }
    self.enter(StoreOp::InsertOrderAtomically).await?;
    let mut tables = self.tables.lock();
    if let Some(orphan) = items.iter().find(|i| i.order_id != order.id) {
      return Err(AppError::store(anyhow::anyhow!(
        "order item for {} passed with order {}",
        orphan.order_id,
        order.id
      )));
    }
    let order = Self::write_order(&mut tables, order);
    let items = Self::write_order_items(&mut tables, items)?;
    Ok(Some(OrderWithItems { order, items }))
  }
}
