// storefront/src/models/product.rs

use crate::errors::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

/// A catalog entry. Prices are whole KRW; stock is units on hand.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  pub description: Option<String>,
  pub price: i64,
  pub category: Option<String>,
  pub stock_quantity: i32,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
  Electronics,
  Clothing,
  Books,
  Food,
  Sports,
  Beauty,
  Home,
}

impl ProductCategory {
  pub const ALL: [ProductCategory; 7] = [
    ProductCategory::Electronics,
    ProductCategory::Clothing,
    ProductCategory::Books,
    ProductCategory::Food,
    ProductCategory::Sports,
    ProductCategory::Beauty,
    ProductCategory::Home,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ProductCategory::Electronics => "electronics",
      ProductCategory::Clothing => "clothing",
      ProductCategory::Books => "books",
      ProductCategory::Food => "food",
      ProductCategory::Sports => "sports",
      ProductCategory::Beauty => "beauty",
      ProductCategory::Home => "home",
    }
  }
}

impl FromStr for ProductCategory {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ProductCategory::ALL
      .into_iter()
      .find(|c| c.as_str() == s)
      .ok_or_else(|| AppError::Validation(format!("Unknown product category '{}'", s)))
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
  PriceAsc,
  PriceDesc,
  #[default]
  CreatedDesc,
  NameAsc,
}

impl ProductSort {
  /// ORDER BY clause for the Postgres backend. Never built from user input.
  pub fn order_by_sql(&self) -> &'static str {
    match self {
      ProductSort::PriceAsc => "price ASC, created_at DESC",
      ProductSort::PriceDesc => "price DESC, created_at DESC",
      ProductSort::CreatedDesc => "created_at DESC",
      ProductSort::NameAsc => "name ASC",
    }
  }
}

/// A normalized catalog page request: `offset`/`limit` are already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
  pub category: Option<ProductCategory>,
  pub sort: ProductSort,
  pub offset: i64,
  pub limit: i64,
}

/// One window of active products plus the exact count of matching rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
  pub products: Vec<Product>,
  pub total: i64,
}
