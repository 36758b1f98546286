// storefront/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::ProductListParams;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct FeaturedQuery {
  pub limit: Option<i64>,
}

#[instrument(name = "handler::list_products", skip(app_state))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<ProductListParams>,
) -> Result<HttpResponse, AppError> {
  let page = app_state.storefront.list_products(&query_params).await?;
  info!(returned = page.products.len(), total = page.total, "Products listed.");
  Ok(HttpResponse::Ok().json(page))
}

#[instrument(name = "handler::featured_products", skip(app_state))]
pub async fn featured_products_handler(
  app_state: web::Data<AppState>,
  query_params: web::Query<FeaturedQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.storefront.featured_products(query_params.limit).await?;
  Ok(HttpResponse::Ok().json(json!({ "products": products })))
}

#[instrument(name = "handler::product_categories", skip(app_state))]
pub async fn product_categories_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let counts = app_state.storefront.product_counts_by_category().await?;
  Ok(HttpResponse::Ok().json(json!({ "categories": counts })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product = app_state.storefront.get_product(path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "product": product })))
}
