// core/src/registry.rs

//! `FlowRegistry<E>`: flows keyed by their context data type.

use crate::core::context_data::FlowContext;
use crate::core::control::FlowOutcome;
use crate::error::FlowError;
use crate::flow::definition::Flow;

use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait AnyFlowRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `ctx_obj` must hold a `FlowContext<TData>` matching the wrapped flow.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct FlowWrapper<TData, FlowErr, AppErr>
where
  TData: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  flow: Arc<Flow<TData, FlowErr>>,
  _phantom: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<TData, FlowErr, AppErr> AnyFlowRunner<AppErr> for FlowWrapper<TData, FlowErr, AppErr>
where
  TData: 'static + Send + Sync,
  FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<FlowErr> + From<FlowError> + Send + Sync + 'static,
{
  #[instrument(
        name = "FlowWrapper::run_erased",
        skip_all,
        fields(target_tdata_type = %std::any::type_name::<TData>()),
        err(Display)
    )]
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let typed_ctx = match ctx_obj.downcast::<FlowContext<TData>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<FlowContext<TData>>();
        event!(Level::ERROR, expected_type, "Context object type mismatch.");
        return Err(AppErr::from(FlowError::TypeMismatch {
          expected_type: expected_type.to_string(),
        }));
      }
    };
    self.flow.run(typed_ctx).await.map_err(AppErr::from)
  }
}

/// Holds at most one flow per context data type and runs the matching one.
///
/// `AppErr` is what `run` returns; every registered flow's error converts into it.
pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  flows: Mutex<HashMap<TypeId, Arc<dyn AnyFlowRunner<AppErr>>>>,
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      flows: Mutex::new(HashMap::new()),
    }
  }

  /// Registers `flow` for its context type, replacing any previous registration.
  pub fn register<TData, FlowErr>(&self, flow: Flow<TData, FlowErr>)
  where
    TData: 'static + Send + Sync,
    FlowErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<FlowErr>,
  {
    event!(Level::DEBUG, tdata_type = %std::any::type_name::<TData>(), steps = ?flow.step_names(), "Registering flow.");
    let wrapper = FlowWrapper::<TData, FlowErr, AppErr> {
      flow: Arc::new(flow),
      _phantom: PhantomData,
    };
    self.flows.lock().insert(TypeId::of::<TData>(), Arc::new(wrapper));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.flows.lock().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the flow registered for `TData` against `ctx`.
  pub async fn run<TData>(&self, ctx: FlowContext<TData>) -> Result<FlowOutcome, AppErr>
  where
    TData: 'static + Send + Sync,
  {
    let runner = {
      let flows = self.flows.lock();
      flows.get(&TypeId::of::<TData>()).cloned()
    };
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, type_name, "No flow registered for context type.");
      AppErr::from(FlowError::NotRegistered {
        type_name: type_name.to_string(),
      })
    })?;

    runner.run_erased(Box::new(ctx)).await
  }
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
