// core/src/flow/hooks.rs

//! Registration of `before`, `on`, `after` and `compensate` handlers.

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use crate::core::handler::{Compensator, Handler};
use crate::error::FlowError;
use crate::flow::definition::Flow;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn wrap<F, UserErr>(handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx| {
      let user_fut = handler_fn(ctx);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    })
  }

  /// Registers a handler that runs before the step's `on` handlers.
  ///
  /// The handler's own error type only has to convert into the flow's `Err`.
  pub fn before<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler = Self::wrap(handler_fn);
    self.before.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers the main handler of a step.
  pub fn on<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler = Self::wrap(handler_fn);
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers a handler that runs after the step's `on` handlers.
  pub fn after<F, UserErr>(&mut self, step_name: &str, handler_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<StepControl, UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let handler = Self::wrap(handler_fn);
    self.after.entry(step_name.to_string()).or_default().push(handler);
  }

  /// Registers a compensating action for a step.
  ///
  /// It runs only if the step completed and a later step then failed. Compensators of
  /// different steps run in reverse step order; several on one step run in registration order.
  pub fn compensate<F, UserErr>(
    &mut self,
    step_name: &str,
    compensate_fn: impl Fn(FlowContext<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<(), UserErr>> + Send + 'static,
    UserErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensator: Compensator<TData, Err> = Box::new(move |ctx| {
      let user_fut = compensate_fn(ctx);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    });
    self
      .compensations
      .entry(step_name.to_string())
      .or_default()
      .push(compensator);
    event!(Level::DEBUG, %step_name, "Compensation registered.");
  }
}
