use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::trace;

/// Delayed view transitions owned by a single view.
///
/// Every callback scheduled here is aborted when the scope is cancelled or
/// dropped, so nothing fires against a view that has already gone away.
/// Must be used from inside a tokio runtime.
#[derive(Debug, Default)]
pub struct TransitionScope {
    pending: Vec<JoinHandle<()>>,
}

/// Handle to one scheduled callback.
#[derive(Debug, Clone)]
pub struct ScheduledTransition {
    handle: tokio::task::AbortHandle,
}

impl ScheduledTransition {
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl TransitionScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once after `delay`, unless the scope is torn down first.
    pub fn schedule<F>(&mut self, delay: Duration, action: F) -> ScheduledTransition
    where
        F: FnOnce() + Send + 'static,
    {
        self.pending.retain(|handle| !handle.is_finished());

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action();
        });
        trace!(delay_ms = delay.as_millis() as u64, "transition scheduled");

        let transition = ScheduledTransition {
            handle: handle.abort_handle(),
        };
        self.pending.push(handle);
        transition
    }

    /// Callbacks that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.pending
            .iter()
            .filter(|handle| !handle.is_finished())
            .count()
    }

    pub fn cancel_all(&mut self) {
        for handle in self.pending.drain(..) {
            handle.abort();
        }
    }
}

impl Drop for TransitionScope {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
