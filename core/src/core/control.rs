// core/src/core/control.rs

//! Signals for controlling flow execution and the outcome of a run.

/// Returned by a handler to say whether the flow should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepControl {
  /// Continue with the remaining handlers of this step and the steps after it.
  Continue,
  /// Halt the flow right here. Nothing else runs and no compensation is triggered.
  Stop,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowOutcome {
  /// Every step ran (or was skipped) to the end.
  Completed,
  /// A handler returned `StepControl::Stop`.
  Stopped,
}
