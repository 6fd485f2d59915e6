use crate::thread::{Condition, Mutex};

/// Lifecycle of the context worker.
///
/// Transitions only move forward:
/// `Starting -> Running -> Draining -> Terminated`, or
/// `Starting -> Terminated` when context activation fails.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum WorkerState {
    Starting,
    Running,
    Draining,
    Terminated,
}

/// Observable worker state with change notification.
#[derive(Debug)]
pub(crate) struct StateCell {
    state: Mutex<WorkerState>,
    changed: Condition,
}

impl StateCell {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(WorkerState::Starting),
            changed: Condition::new(),
        }
    }

    pub(crate) fn get(&self) -> WorkerState {
        *self.state.lock()
    }

    /// Advances to `next`. Backward transitions are ignored.
    pub(crate) fn advance(&self, next: WorkerState) {
        let mut state = self.state.lock();
        if next <= *state {
            return;
        }
        log::debug!("graphics worker {:?} -> {next:?}", *state);
        *state = next;
        self.changed.broadcast();
    }

    /// Blocks until the worker has left `Starting`, returning the new state.
    pub(crate) fn wait_started(&self) -> WorkerState {
        *self
            .changed
            .wait_while(self.state.lock(), |state| *state == WorkerState::Starting)
    }
}
