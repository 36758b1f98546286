// tests/common/mod.rs
#![allow(dead_code)]

use storefront_flow::{FlowContext, FlowError, StepControl};
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub compensated: Vec<String>,
  pub should_stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError is not Clone/Eq, so it is kept as its Debug text.
  #[error("Flow framework error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),

  #[error("Test compensation failed: {0}")]
  Compensation(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

pub fn create_simple_handler(
  step_name: &'static str,
  message_to_append: &'static str,
) -> storefront_flow::Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = %step_name, "executed, counter: {}", guard.counter);
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn create_failing_handler(
  step_name: &'static str,
  error_message: &'static str,
) -> storefront_flow::Handler<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      tracing::warn!(target: "test_handlers", step = %step_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

pub fn create_compensator(
  step_name: &'static str,
) -> storefront_flow::Compensator<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      ctx.write().compensated.push(step_name.to_string());
      Ok(())
    })
  })
}

pub fn create_failing_compensator(
  step_name: &'static str,
  error_message: &'static str,
) -> storefront_flow::Compensator<TestContext, TestError> {
  Box::new(move |ctx: FlowContext<TestContext>| {
    Box::pin(async move {
      ctx.write().compensated.push(step_name.to_string());
      Err(TestError::Compensation(error_message.to_string()))
    })
  })
}

use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
