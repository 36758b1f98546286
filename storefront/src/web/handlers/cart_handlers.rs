// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::auth::AuthenticatedUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
  #[serde(default = "one")]
  pub quantity: i32,
}

fn one() -> i32 {
  1
}

#[derive(Deserialize, Debug)]
pub struct SetQuantityPayload {
  pub quantity: i32,
}

#[instrument(name = "handler::get_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn get_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let summary = app_state.storefront.summarize(&auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(summary))
}

#[instrument(name = "handler::cart_count", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn cart_count_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let count = app_state.storefront.item_count(&auth_user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(user_id = %auth_user.user_id, product_id = %req_payload.product_id, quantity = req_payload.quantity)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let item = app_state
    .storefront
    .add_item(&auth_user.user_id, req_payload.product_id, req_payload.quantity)
    .await?;
  info!(cart_item_id = %item.id, new_quantity = item.quantity, "Item added to cart.");
  Ok(HttpResponse::Ok().json(json!({ "cartItem": item })))
}

#[instrument(name = "handler::set_cart_quantity", skip(app_state, req_payload, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn set_quantity_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<SetQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state
    .storefront
    .set_quantity(&auth_user.user_id, path.into_inner(), req_payload.quantity)
    .await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::remove_cart_item", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn remove_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.storefront.remove_item(&auth_user.user_id, path.into_inner()).await?;
  Ok(HttpResponse::NoContent().finish())
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(user_id = %auth_user.user_id))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  app_state.storefront.clear_cart(&auth_user.user_id).await?;
  Ok(HttpResponse::NoContent().finish())
}
