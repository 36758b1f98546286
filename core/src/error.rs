// core/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

/// Framework-level failures raised by the flow engine itself.
///
/// Application error types used as a flow's `Err` must implement `From<FlowError>`
/// so these can be surfaced through the same `Result`.
#[derive(Debug, Error)]
pub enum FlowError {
  #[error("Step not found: {step_name}")]
  StepNotFound { step_name: String },

  #[error("Handler missing for non-optional step: {step_name}")]
  HandlerMissing { step_name: String },

  #[error("Type mismatch during context dispatch (expected {expected_type})")]
  TypeMismatch { expected_type: String },

  #[error("No flow registered for context type {type_name}")]
  NotRegistered { type_name: String },

  #[error("Error in handler or external operation. Source: {source}")]
  Handler {
    #[source]
    source: AnyhowError,
  },
}

impl From<AnyhowError> for FlowError {
  fn from(err: AnyhowError) -> Self {
    // An anyhow error that already wraps a FlowError keeps its message chain intact here.
    FlowError::Handler { source: err }
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
