// core/src/flow/execution.rs

//! `Flow::run()`: executes steps in order and unwinds completed steps on failure.

use crate::core::context_data::FlowContext;
use crate::core::control::{FlowOutcome, StepControl};
use crate::core::handler::Handler;
use crate::error::FlowError;
use crate::flow::definition::Flow;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Flow<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the flow against the shared context `ctx_data`.
  ///
  /// When a step fails, the compensators of every step that already completed run in
  /// reverse order. The original error is returned unless a compensator fails, in which
  /// case the first compensation error is returned instead: the flow could not be
  /// rolled back and the caller has to know.
  #[instrument(
        name = "Flow::run",
        skip_all,
        fields(
            flow_context_data_type = %std::any::type_name::<TData>(),
            num_steps = self.steps.len(),
        ),
        err(Display)
    )]
  pub async fn run(&self, ctx_data: FlowContext<TData>) -> Result<FlowOutcome, Err> {
    event!(Level::DEBUG, "Flow execution starting.");
    let mut completed: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "flow_step_execution",
        step_name = step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          event!(parent: &step_span, Level::INFO, "Step skipped due to 'skip_if' condition.");
          continue;
        }
      }

      let has_handlers = [&self.before, &self.on, &self.after]
        .iter()
        .any(|phase| phase.get(step_name).map_or(false, |v| !v.is_empty()));

      if !has_handlers {
        if step_def.optional {
          event!(parent: &step_span, Level::DEBUG, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(parent: &step_span, Level::ERROR, "Non-optional step has no handlers.");
        let err = Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        });
        return Err(self.unwind(&completed, ctx_data, err).await);
      }

      match self.run_step(step_name, ctx_data.clone()).instrument(step_span).await {
        Ok(StepControl::Continue) => completed.push(step_name),
        Ok(StepControl::Stop) => {
          event!(Level::INFO, step_name, "Flow stopped by a handler.");
          return Ok(FlowOutcome::Stopped);
        }
        Err(e) => return Err(self.unwind(&completed, ctx_data, e).await),
      }
    }

    event!(Level::DEBUG, "Flow execution completed successfully.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step_name: &str, ctx_data: FlowContext<TData>) -> Result<StepControl, Err> {
    event!(Level::DEBUG, "Processing step.");
    for (phase, handlers) in [("before", &self.before), ("on", &self.on), ("after", &self.after)] {
      if let Some(handlers) = handlers.get(step_name) {
        if run_phase(phase, handlers, &ctx_data).await? == StepControl::Stop {
          return Ok(StepControl::Stop);
        }
      }
    }
    event!(Level::DEBUG, "Step processing finished successfully.");
    Ok(StepControl::Continue)
  }

  async fn unwind(&self, completed: &[&str], ctx_data: FlowContext<TData>, original: Err) -> Err {
    event!(Level::ERROR, error = %original, completed_steps = completed.len(), "Step failed, compensating completed steps.");
    let mut first_failure: Option<Err> = None;

    for step_name in completed.iter().rev() {
      let Some(compensators) = self.compensations.get(*step_name) else {
        continue;
      };
      for compensate in compensators {
        match compensate(ctx_data.clone()).await {
          Ok(()) => event!(Level::INFO, step_name, "Step compensated."),
          Err(e) => {
            event!(Level::ERROR, step_name, error = %e, "Compensation failed.");
            if first_failure.is_none() {
              first_failure = Some(e);
            }
          }
        }
      }
    }

    match first_failure {
      Some(compensation_err) => {
        event!(Level::ERROR, original_error = %original, "Flow left partially applied.");
        compensation_err
      }
      None => original,
    }
  }
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: &[Handler<TData, Err>],
  ctx_data: &FlowContext<TData>,
) -> Result<StepControl, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    match handler_fn(ctx_data.clone()).await {
      Ok(StepControl::Continue) => {}
      Ok(StepControl::Stop) => {
        event!(Level::INFO, phase, handler_index = handler_idx, "Handler requested stop.");
        return Ok(StepControl::Stop);
      }
      Err(e) => {
        event!(Level::ERROR, phase, handler_index = handler_idx, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(StepControl::Continue)
}
