// storefront/src/revalidate.rs

//! Invalidation of cached storefront pages after a successful write.

use parking_lot::Mutex;
use uuid::Uuid;

pub const CART_PATH: &str = "/cart";
pub const PRODUCTS_PATH: &str = "/products";
pub const CHECKOUT_PATH: &str = "/checkout";
pub const ORDERS_PATH: &str = "/orders";

pub fn order_path(order_id: Uuid) -> String {
  format!("{}/{}", ORDERS_PATH, order_id)
}

/// Told which cached views went stale. Called only after the write succeeded.
pub trait ViewInvalidator: Send + Sync {
  fn invalidate(&self, path: &str);
}

/// Default invalidator for deployments without a page cache: it only logs.
#[derive(Debug, Default)]
pub struct LogInvalidator;

impl ViewInvalidator for LogInvalidator {
  fn invalidate(&self, path: &str) {
    tracing::debug!(path, "Cached view invalidated.");
  }
}

/// Keeps every invalidated path, in order.
#[derive(Debug, Default)]
pub struct RecordingInvalidator {
  paths: Mutex<Vec<String>>,
}

impl RecordingInvalidator {
  pub fn paths(&self) -> Vec<String> {
    self.paths.lock().clone()
  }

  pub fn take(&self) -> Vec<String> {
    std::mem::take(&mut *self.paths.lock())
  }
}

impl ViewInvalidator for RecordingInvalidator {
  fn invalidate(&self, path: &str) {
    self.paths.lock().push(path.to_string());
  }
}
