// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// Postgres connection string. Without one the server runs on the in-memory store.
  pub database_url: Option<String>,
  /// Origin used to build payment success/fail redirect URLs.
  pub app_base_url: String,

  pub products_per_page: i64,
  pub featured_products_limit: i64,

  /// Header carrying the identity provider's user id on every authenticated request.
  pub auth_user_header: String,

  pub seed_demo_catalog: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      app_base_url: "http://127.0.0.1:8080".to_string(),
      products_per_page: 12,
      featured_products_limit: 8,
      auth_user_header: "X-User-ID".to_string(),
      seed_demo_catalog: false,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|var_name| env::var(var_name).ok())?;
    tracing::info!(
      in_memory_store = config.database_url.is_none(),
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  /// Builds the config from any variable source; unset variables take their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = parse_or(&lookup, "SERVER_PORT", defaults.server_port)?;
    let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
    let app_base_url = lookup("APP_BASE_URL")
      .map(|url| url.trim_end_matches('/').to_string())
      .unwrap_or_else(|| format!("http://{}:{}", server_host, server_port));

    let products_per_page = parse_or(&lookup, "PRODUCTS_PER_PAGE", defaults.products_per_page)?;
    let featured_products_limit = parse_or(&lookup, "FEATURED_PRODUCTS_LIMIT", defaults.featured_products_limit)?;
    if products_per_page < 1 || featured_products_limit < 1 {
      return Err(AppError::Config(
        "PRODUCTS_PER_PAGE and FEATURED_PRODUCTS_LIMIT must be positive".to_string(),
      ));
    }

    let auth_user_header = lookup("AUTH_USER_HEADER").unwrap_or(defaults.auth_user_header);
    let seed_demo_catalog = parse_or(&lookup, "SEED_DEMO_CATALOG", defaults.seed_demo_catalog)?;

    Ok(Self {
      server_host,
      server_port,
      database_url,
      app_base_url,
      products_per_page,
      featured_products_limit,
      auth_user_header,
      seed_demo_catalog,
    })
  }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, var_name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match lookup(var_name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, raw, e))),
    None => Ok(default),
  }
}
