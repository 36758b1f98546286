// storefront/src/storefront.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::flows;
use crate::models::UserId;
use crate::revalidate::{LogInvalidator, ViewInvalidator};
use crate::store::{Scoped, SharedStore, UserScope};
use std::sync::Arc;
use storefront_flow::{FlowContext, FlowError, FlowOutcome, FlowRegistry};

/// Entry point for every storefront operation.
///
/// Cheap to clone; the store, flow registry and invalidator are shared.
#[derive(Clone)]
pub struct Storefront {
  store: SharedStore,
  flows: Arc<FlowRegistry<AppError>>,
  invalidator: Arc<dyn ViewInvalidator>,
  config: Arc<AppConfig>,
}

impl Storefront {
  pub fn new(store: SharedStore, config: Arc<AppConfig>) -> Self {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    flows::register_all_flows(&flows);
    Self {
      store,
      flows,
      invalidator: Arc::new(LogInvalidator),
      config,
    }
  }

  pub fn with_invalidator(mut self, invalidator: Arc<dyn ViewInvalidator>) -> Self {
    self.invalidator = invalidator;
    self
  }

  pub fn store(&self) -> &SharedStore {
    &self.store
  }

  pub fn config(&self) -> &AppConfig {
    &self.config
  }

  pub(crate) fn scope(&self, user: &UserId) -> UserScope {
    self.store.scoped(user)
  }

  pub(crate) fn invalidate(&self, paths: &[&str]) {
    for path in paths {
      self.invalidator.invalidate(path);
    }
  }

  /// Runs the flow registered for `T` and hands back its final context.
  pub(crate) async fn run_flow<T>(&self, data: T) -> Result<FlowContext<T>>
  where
    T: Send + Sync + 'static,
  {
    let ctx = FlowContext::new(data);
    match self.flows.run(ctx.clone()).await? {
      FlowOutcome::Completed => Ok(ctx),
      FlowOutcome::Stopped => {
        tracing::warn!(flow = %std::any::type_name::<T>(), "Flow was halted by a handler.");
        Err(flow_incomplete(std::any::type_name::<T>()))
      }
    }
  }
}

/// A flow finished without producing what its caller reads back.
pub(crate) fn flow_incomplete(what: &str) -> AppError {
  AppError::Workflow {
    source: FlowError::Handler {
      source: anyhow::anyhow!("flow finished without producing {}", what),
    },
  }
}
