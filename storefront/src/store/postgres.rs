// storefront/src/store/postgres.rs

//! `sqlx` backend over the schema in `migrations/`.

use super::StorefrontStore;
use crate::errors::Result;
use crate::models::{
  CartItem, NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, OrderWithItems, Product, ProductPage, ProductQuery,
  UserId,
};
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
  "id, name, description, price, category, stock_quantity, is_active, created_at, updated_at";
const CART_ITEM_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";
const ORDER_COLUMNS: &str =
  "id, user_id, total_amount, status, shipping_address, order_note, created_at, updated_at";
const ORDER_ITEM_COLUMNS: &str = "id, order_id, line_no, product_id, product_name, quantity, price, created_at";

#[derive(Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }

  fn push_active_filter(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    qb.push(" WHERE is_active = TRUE");
    if let Some(category) = query.category {
      qb.push(" AND category = ").push_bind(category.as_str());
    }
  }

  fn order_items_insert(items: &[NewOrderItem]) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO order_items (id, order_id, line_no, product_id, product_name, quantity, price) ");
    qb.push_values(items, |mut row, item| {
      row
        .push_bind(Uuid::new_v4())
        .push_bind(item.order_id)
        .push_bind(item.line_no)
        .push_bind(item.product_id)
        .push_bind(&item.product_name)
        .push_bind(item.quantity)
        .push_bind(item.price);
    });
    qb.push(" RETURNING ").push(ORDER_ITEM_COLUMNS);
    qb
  }
}

#[async_trait]
impl StorefrontStore for PgStore {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).bind(id).fetch_optional(&self.pool).await?)
  }

  async fn get_products(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
    let sql = format!("SELECT {} FROM products WHERE id = ANY($1)", PRODUCT_COLUMNS);
    Ok(sqlx::query_as::<_, Product>(&sql).bind(ids).fetch_all(&self.pool).await?)
  }

  #[instrument(name = "PgStore::query_products", skip(self), err(Display))]
  async fn query_products(&self, query: &ProductQuery) -> Result<ProductPage> {
    let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
    Self::push_active_filter(&mut count_qb, query);
    let total = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

    let mut qb = QueryBuilder::<Postgres>::new("SELECT ");
    qb.push(PRODUCT_COLUMNS).push(" FROM products");
    Self::push_active_filter(&mut qb, query);
    qb.push(" ORDER BY ").push(query.sort.order_by_sql());
    qb.push(" LIMIT ").push_bind(query.limit);
    qb.push(" OFFSET ").push_bind(query.offset);
    let products = qb.build_query_as::<Product>().fetch_all(&self.pool).await?;

    Ok(ProductPage { products, total })
  }

  async fn featured_products(&self, limit: i64) -> Result<Vec<Product>> {
    let sql = format!(
      "SELECT {} FROM products WHERE is_active = TRUE ORDER BY created_at DESC LIMIT $1",
      PRODUCT_COLUMNS
    );
    Ok(sqlx::query_as::<_, Product>(&sql).bind(limit).fetch_all(&self.pool).await?)
  }

  async fn active_product_categories(&self) -> Result<Vec<Option<String>>> {
    Ok(
      sqlx::query_scalar::<_, Option<String>>("SELECT category FROM products WHERE is_active = TRUE")
        .fetch_all(&self.pool)
        .await?,
    )
  }

  async fn find_cart_item(&self, user: &UserId, product_id: Uuid) -> Result<Option<CartItem>> {
    let sql = format!(
      "SELECT {} FROM cart_items WHERE user_id = $1 AND product_id = $2",
      CART_ITEM_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, CartItem>(&sql)
        .bind(user)
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn get_cart_item(&self, user: &UserId, id: Uuid) -> Result<Option<CartItem>> {
    let sql = format!("SELECT {} FROM cart_items WHERE user_id = $1 AND id = $2", CART_ITEM_COLUMNS);
    Ok(
      sqlx::query_as::<_, CartItem>(&sql)
        .bind(user)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn upsert_cart_item(&self, user: &UserId, product_id: Uuid, quantity: i32) -> Result<CartItem> {
    let sql = format!(
      "INSERT INTO cart_items (id, user_id, product_id, quantity) VALUES ($1, $2, $3, $4) \
       ON CONFLICT (user_id, product_id) DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = NOW() \
       RETURNING {}",
      CART_ITEM_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, CartItem>(&sql)
        .bind(Uuid::new_v4())
        .bind(user)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn update_cart_item_quantity(&self, user: &UserId, id: Uuid, quantity: i32) -> Result<u64> {
    let result = sqlx::query("UPDATE cart_items SET quantity = $3, updated_at = NOW() WHERE user_id = $1 AND id = $2")
      .bind(user)
      .bind(id)
      .bind(quantity)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn delete_cart_item(&self, user: &UserId, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = $2")
      .bind(user)
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn delete_cart_items(&self, user: &UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
      .bind(user)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn list_cart_items(&self, user: &UserId) -> Result<Vec<CartItem>> {
    let sql = format!(
      "SELECT {} FROM cart_items WHERE user_id = $1 ORDER BY created_at DESC",
      CART_ITEM_COLUMNS
    );
    Ok(sqlx::query_as::<_, CartItem>(&sql).bind(user).fetch_all(&self.pool).await?)
  }

  async fn insert_order(&self, order: NewOrder) -> Result<Order> {
    let sql = format!(
      "INSERT INTO orders (id, user_id, total_amount, status, shipping_address, order_note) \
       VALUES ($1, $2, $3, 'pending', $4, $5) RETURNING {}",
      ORDER_COLUMNS
    );
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(order.id)
        .bind(&order.user_id)
        .bind(order.total_amount)
        .bind(Json(&order.shipping_address))
        .bind(&order.order_note)
        .fetch_one(&self.pool)
        .await?,
    )
  }

  async fn insert_order_items(&self, items: Vec<NewOrderItem>) -> Result<Vec<OrderItem>> {
    if items.is_empty() {
      return Ok(Vec::new());
    }
    let mut qb = Self::order_items_insert(&items);
    Ok(qb.build_query_as::<OrderItem>().fetch_all(&self.pool).await?)
  }

  async fn delete_order(&self, user: &UserId, id: Uuid) -> Result<u64> {
    let result = sqlx::query("DELETE FROM orders WHERE user_id = $1 AND id = $2")
      .bind(user)
      .bind(id)
      .execute(&self.pool)
      .await?;
    Ok(result.rows_affected())
  }

  async fn get_order(&self, user: &UserId, id: Uuid) -> Result<Option<Order>> {
    let sql = format!("SELECT {} FROM orders WHERE user_id = $1 AND id = $2", ORDER_COLUMNS);
    Ok(
      sqlx::query_as::<_, Order>(&sql)
        .bind(user)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?,
    )
  }

  async fn list_orders(&self, user: &UserId) -> Result<Vec<Order>> {
    let sql = format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
      ORDER_COLUMNS
    );
    Ok(sqlx::query_as::<_, Order>(&sql).bind(user).fetch_all(&self.pool).await?)
  }

  async fn list_order_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
    let sql = format!(
      "SELECT {} FROM order_items WHERE order_id = $1 ORDER BY line_no ASC",
      ORDER_ITEM_COLUMNS
    );
    Ok(sqlx::query_as::<_, OrderItem>(&sql).bind(order_id).fetch_all(&self.pool).await?)
  }

  async fn update_order_status(&self, user: &UserId, id: Uuid, from: OrderStatus, to: OrderStatus) -> Result<u64> {
    let result = sqlx::query(
      "UPDATE orders SET status = $4, updated_at = NOW() WHERE user_id = $1 AND id = $2 AND status = $3",
    )
    .bind(user)
    .bind(id)
    .bind(from)
    .bind(to)
    .execute(&self.pool)
    .await?;
    Ok(result.rows_affected())
  }

  #[instrument(name = "PgStore::insert_order_atomically", skip_all, fields(order_id = %order.id), err(Display))]
  async fn insert_order_atomically(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<Option<OrderWithItems>> {
    let mut tx = self.pool.begin().await?;

    let sql = format!(
      "INSERT INTO orders (id, user_id, total_amount, status, shipping_address, order_note) \
       VALUES ($1, $2, $3, 'pending', $4, $5) RETURNING {}",
      ORDER_COLUMNS
    );
    let order = sqlx::query_as::<_, Order>(&sql)
      .bind(order.id)
      .bind(&order.user_id)
      .bind(order.total_amount)
      .bind(Json(&order.shipping_address))
      .bind(&order.order_note)
      .fetch_one(&mut *tx)
      .await?;

    let items = if items.is_empty() {
      Vec::new()
    } else {
      let mut qb = Self::order_items_insert(&items);
      qb.build_query_as::<OrderItem>().fetch_all(&mut *tx).await?
    };

    tx.commit().await?;
    Ok(Some(OrderWithItems { order, items }))
  }
}
