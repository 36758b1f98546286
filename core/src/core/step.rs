// core/src/core/step.rs

//! Step metadata, fixed when a flow is built.

use super::FlowContext;

/// Checked against the run's current data when the step comes up; `true` means none of
/// its handlers run and it gets no compensation entry.
pub type SkipCondition<TData> = std::sync::Arc<dyn Fn(FlowContext<TData>) -> bool + Send + Sync + 'static>;

/// `optional` steps may be left without handlers; a required step with none
/// fails the run with `HandlerMissing`.
#[derive(Clone)]
pub struct StepDef<T: 'static + Send + Sync> {
  pub name: String,
  pub optional: bool,
  pub skip_if: Option<SkipCondition<T>>,
}

impl<T: 'static + Send + Sync> std::fmt::Debug for StepDef<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("StepDef")
      .field("name", &self.name)
      .field("optional", &self.optional)
      .field("skip_if_present", &self.skip_if.is_some())
      .finish()
  }
}
