// storefront/src/web/routes.rs

use crate::web::handlers::{cart_handlers, order_handlers, payment_handlers, product_handlers};
use actix_web::web;

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/products")
          .route("", web::get().to(product_handlers::list_products_handler))
          // Registered before `/{product_id}` so they are not parsed as ids.
          .route("/featured", web::get().to(product_handlers::featured_products_handler))
          .route("/categories", web::get().to(product_handlers::product_categories_handler))
          .route("/{product_id}", web::get().to(product_handlers::get_product_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/count", web::get().to(cart_handlers::cart_count_handler))
          .route("/items", web::post().to(cart_handlers::add_to_cart_handler))
          .route("/items/{cart_item_id}", web::patch().to(cart_handlers::set_quantity_handler))
          .route("/items/{cart_item_id}", web::delete().to(cart_handlers::remove_item_handler)),
      )
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_order_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}/payment", web::get().to(order_handlers::order_payment_handler))
          .route("/{order_id}/cancel", web::post().to(order_handlers::cancel_order_handler)),
      )
      .service(
        web::scope("/payments")
          .route("/success", web::get().to(payment_handlers::payment_success_handler))
          .route("/fail", web::get().to(payment_handlers::payment_fail_handler)),
      ),
  );
}
