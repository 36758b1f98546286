// core/src/core/context_data.rs
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// The data of one flow run. Handlers, compensators and skip conditions all receive
/// a clone pointing at the same value; the flow's caller keeps one to read results.
///
/// The lock is a `parking_lot` lock, so copy what a handler needs out of a guard
/// and drop it before calling the store.
#[derive(Debug)]
pub struct FlowContext<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> FlowContext<T> {
  pub fn new(data: T) -> Self {
    FlowContext(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  /// Blocks until no handler or compensator holds the lock.
  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }
}

impl<T: Send + Sync + 'static> Clone for FlowContext<T> {
  fn clone(&self) -> Self {
    FlowContext(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for FlowContext<T> {
  fn default() -> Self {
    Self::new(Default::default())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clones_see_each_others_writes() {
    let ctx = FlowContext::new(vec![1]);
    let handler_view = ctx.clone();
    handler_view.write().push(2);
    assert_eq!(*ctx.read(), vec![1, 2]);
  }

  #[test]
  fn default_wraps_default_data() {
    let ctx: FlowContext<Option<u32>> = FlowContext::default();
    assert!(ctx.read().is_none());
  }
}
