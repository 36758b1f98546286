// src/lib.rs

//! storefront-flow: a small async step engine for multi-step business operations.
//!
//! A `Flow` is an ordered list of named steps. Each step carries `before`/`on`/`after`
//! handlers and optionally a compensating action. When a step fails, the compensations
//! of the steps that already completed run in reverse order, so a flow either applies
//! fully or is rolled back (or reports that it could not be).
//!
//! Handlers share a `FlowContext<T>`, an `Arc<RwLock<T>>` they lock briefly and release
//! before awaiting.

pub mod core;
pub mod error;
pub mod flow;
pub mod registry;

pub use crate::core::context_data::FlowContext;
pub use crate::core::control::{FlowOutcome, StepControl};
pub use crate::core::handler::{Compensator, Handler};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::flow::definition::Flow;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
