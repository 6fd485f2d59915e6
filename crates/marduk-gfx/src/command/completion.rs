use std::sync::Arc;

use crate::thread::{Condition, Mutex, MutexGuard};

use super::Output;

/// How a synchronous envelope finished.
pub(crate) enum Outcome {
    /// The command ran; `Some` for `Return*` variants.
    Done(Option<Output>),
    /// The envelope was dropped without running.
    Abandoned,
}

pub(crate) struct Slot {
    done: bool,
    outcome: Option<Outcome>,
}

struct Shared {
    slot: Mutex<Slot>,
    condition: Condition,
}

/// Creates the two halves of a one-shot completion.
///
/// Exactly one [`Completer`] signals exactly one [`Completion`]. If the
/// completer is dropped without firing, the waiter is released with
/// [`Outcome::Abandoned`].
pub(crate) fn completion() -> (Completer, Completion) {
    let shared = Arc::new(Shared {
        slot: Mutex::new(Slot {
            done: false,
            outcome: None,
        }),
        condition: Condition::new(),
    });

    (
        Completer {
            shared: Some(Arc::clone(&shared)),
        },
        Completion { shared },
    )
}

/// Worker-side half; travels inside the envelope.
pub(crate) struct Completer {
    shared: Option<Arc<Shared>>,
}

impl Completer {
    pub(crate) fn complete(mut self, result: Option<Output>) {
        if let Some(shared) = self.shared.take() {
            fire(&shared, Outcome::Done(result));
        }
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            fire(&shared, Outcome::Abandoned);
        }
    }
}

fn fire(shared: &Shared, outcome: Outcome) {
    shared.condition.signal_with(&shared.slot, |slot| {
        slot.outcome = Some(outcome);
        slot.done = true;
    });
}

/// Submitter-side half; owned by the waiting thread.
pub(crate) struct Completion {
    shared: Arc<Shared>,
}

impl Completion {
    /// Locks the slot. Holding the guard across the push means the signal
    /// cannot be delivered before the waiter is parked.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Slot> {
        self.shared.slot.lock()
    }

    /// Waits for `done`, consuming the guard from [`lock`](Self::lock).
    pub(crate) fn wait(&self, guard: MutexGuard<'_, Slot>) -> Outcome {
        let mut guard = self.shared.condition.wait_while(guard, |slot| !slot.done);
        guard.outcome.take().unwrap_or(Outcome::Abandoned)
    }
}
