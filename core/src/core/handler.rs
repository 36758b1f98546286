// core/src/core/handler.rs

//! Boxed handler types stored by a `Flow`.

use crate::core::context_data::FlowContext;
use crate::core::control::StepControl;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the shared context and resolves to a
/// `StepControl` or the flow's error type.
///
/// Handlers must release every lock guard before awaiting.
pub type Handler<TData, Err> = Box<
  dyn Fn(FlowContext<TData>) -> Pin<Box<dyn Future<Output = Result<StepControl, Err>> + Send>>
    + Send
    + Sync,
>;

/// Undoes the effect of a completed step when a later step fails.
pub type Compensator<TData, Err> =
  Box<dyn Fn(FlowContext<TData>) -> Pin<Box<dyn Future<Output = Result<(), Err>> + Send>> + Send + Sync>;
