// storefront/src/state.rs

use crate::config::AppConfig;
use crate::storefront::Storefront;
use std::sync::Arc;

/// Shared with every actix handler through `web::Data`.
#[derive(Clone)]
pub struct AppState {
  pub storefront: Storefront,
  pub config: Arc<AppConfig>,
}
