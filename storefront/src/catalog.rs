// storefront/src/catalog.rs

//! Read-only product catalog. Only active products are ever listed.

use crate::errors::{AppError, Result};
use crate::models::{Product, ProductCategory, ProductQuery, ProductSort};
use crate::storefront::Storefront;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::instrument;
use uuid::Uuid;

pub const UNCATEGORIZED: &str = "uncategorized";
const MAX_PAGE_SIZE: i64 = 100;

/// Catalog page request as it arrives from the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductListParams {
  pub category: Option<String>,
  pub sort: Option<ProductSort>,
  pub page: Option<i64>,
  pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
  pub products: Vec<Product>,
  pub total: i64,
  pub page: i64,
  pub total_pages: i64,
}

impl ProductListParams {
  /// Resolves defaults: page below 1 becomes 1, a missing or non-positive limit
  /// becomes `default_limit`, "all" or an empty category means no filter.
  pub fn resolve(&self, default_limit: i64) -> Result<(ProductQuery, i64)> {
    let category = match self.category.as_deref().map(str::trim) {
      None | Some("") | Some("all") => None,
      Some(raw) => Some(raw.parse::<ProductCategory>()?),
    };
    let page = self.page.unwrap_or(1).max(1);
    let limit = match self.limit {
      Some(limit) if limit > 0 => limit.min(MAX_PAGE_SIZE),
      _ => default_limit,
    };
    let query = ProductQuery {
      category,
      sort: self.sort.unwrap_or_default(),
      offset: (page - 1).saturating_mul(limit),
      limit,
    };
    Ok((query, page))
  }
}

impl Storefront {
  #[instrument(name = "Storefront::list_products", skip(self))]
  pub async fn list_products(&self, params: &ProductListParams) -> Result<ProductListResponse> {
    let (query, page) = params.resolve(self.config().products_per_page)?;
    let result = self.store().query_products(&query).await?;
    let total_pages = (result.total + query.limit - 1) / query.limit;
    Ok(ProductListResponse {
      products: result.products,
      total: result.total,
      page,
      total_pages,
    })
  }

  /// An active product. Inactive and missing products are both `ProductNotFound`.
  pub async fn get_product(&self, id: Uuid) -> Result<Product> {
    match self.store().get_product(id).await? {
      Some(product) if product.is_active => Ok(product),
      _ => Err(AppError::ProductNotFound),
    }
  }

  pub async fn featured_products(&self, limit: Option<i64>) -> Result<Vec<Product>> {
    let limit = limit
      .filter(|l| *l > 0)
      .map(|l| l.min(MAX_PAGE_SIZE))
      .unwrap_or(self.config().featured_products_limit);
    self.store().featured_products(limit).await
  }

  /// Active product counts keyed by category; products without one count as `uncategorized`.
  pub async fn product_counts_by_category(&self) -> Result<BTreeMap<String, i64>> {
    let categories = self.store().active_product_categories().await?;
    let mut counts = BTreeMap::new();
    for category in categories {
      *counts.entry(category.unwrap_or_else(|| UNCATEGORIZED.to_string())).or_insert(0) += 1;
    }
    Ok(counts)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolve_applies_defaults() {
    let (query, page) = ProductListParams::default().resolve(12).unwrap();
    assert_eq!(page, 1);
    assert_eq!(query.offset, 0);
    assert_eq!(query.limit, 12);
    assert_eq!(query.sort, ProductSort::CreatedDesc);
    assert!(query.category.is_none());
  }

  #[test]
  fn resolve_clamps_page_and_limit() {
    let params = ProductListParams {
      page: Some(-3),
      limit: Some(0),
      ..Default::default()
    };
    let (query, page) = params.resolve(12).unwrap();
    assert_eq!((page, query.offset, query.limit), (1, 0, 12));

    let params = ProductListParams {
      page: Some(3),
      limit: Some(5000),
      ..Default::default()
    };
    let (query, _) = params.resolve(12).unwrap();
    assert_eq!((query.offset, query.limit), (200, 100));
  }

  #[test]
  fn resolve_parses_category() {
    let params = ProductListParams {
      category: Some("clothing".to_string()),
      ..Default::default()
    };
    assert_eq!(params.resolve(12).unwrap().0.category, Some(ProductCategory::Clothing));

    let all = ProductListParams {
      category: Some("all".to_string()),
      ..Default::default()
    };
    assert!(all.resolve(12).unwrap().0.category.is_none());

    let unknown = ProductListParams {
      category: Some("weapons".to_string()),
      ..Default::default()
    };
    assert!(matches!(unknown.resolve(12), Err(AppError::Validation(_))));
  }
}
