// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::PgPool;
use std::sync::Arc;
use storefront::config::AppConfig;
use storefront::state::AppState;
use storefront::store::{MemoryStore, PgStore, SharedStore};
use storefront::web::configure_app_routes;
use storefront::Storefront;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting storefront server...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      panic!("Configuration error: {}", e);
    }
  };

  let store: SharedStore = match app_config.database_url.as_deref() {
    Some(database_url) => {
      let db_pool = match PgPool::connect(database_url).await {
        Ok(pool) => {
          tracing::info!("Successfully connected to the database.");
          pool
        }
        Err(e) => {
          tracing::error!(error = %e, "Failed to connect to the database.");
          panic!("Database connection error: {}", e);
        }
      };
      if let Err(e) = sqlx::migrate!("./migrations").run(&db_pool).await {
        tracing::error!(error = %e, "Failed to run database migrations.");
        panic!("Migration error: {}", e);
      }
      Arc::new(PgStore::new(db_pool))
    }
    None => {
      tracing::warn!("DATABASE_URL not set, using the in-memory store. Data is lost on restart.");
      let memory = MemoryStore::new();
      if app_config.seed_demo_catalog {
        let seeded = memory.seed_demo_catalog();
        tracing::info!(products = seeded.len(), "Demo catalog seeded.");
      }
      Arc::new(memory)
    }
  };

  let app_state = AppState {
    storefront: Storefront::new(store, app_config.clone()),
    config: app_config.clone(),
  };

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
