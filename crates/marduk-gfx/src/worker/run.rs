use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::command::{Command, Envelope};
use crate::context::{self, RenderContext};

use super::shared::Shared;
use super::state::WorkerState;

/// Closes the queue and publishes `Terminated` however the loop exits,
/// including by unwinding, so no producer can block on a dead worker.
struct ExitGuard<'a> {
    shared: &'a Shared,
}

impl Drop for ExitGuard<'_> {
    fn drop(&mut self) {
        let leftover = self.shared.queue.close();
        if !leftover.is_empty() {
            log::warn!("graphics worker exited with {} queued command(s)", leftover.len());
        }
        drop(leftover);
        self.shared.state.advance(WorkerState::Terminated);
    }
}

/// Body of the context worker thread.
pub(super) fn run<C: RenderContext>(shared: Arc<Shared>, mut context: C) -> anyhow::Result<()> {
    let _exit = ExitGuard { shared: &*shared };
    let label = context.label().to_owned();

    log::debug!("activating {label} on graphics worker");
    if let Err(err) = context.make_current() {
        log::error!("fatal: failed to activate {label} on graphics worker: {err:#}");
        return Err(err.context(format!("failed to activate {label}")));
    }

    context::install(context);
    shared.state.advance(WorkerState::Running);

    loop {
        if shared.is_stopping() {
            log::debug!("graphics worker observed shutdown request");
            break;
        }

        match shared.queue.pop() {
            Some(Command::Run(envelope)) => dispatch(envelope),
            Some(Command::Terminate) => {
                log::debug!("graphics worker received terminate command");
                break;
            }
            None => {
                log::warn!("command queue closed under a running graphics worker");
                break;
            }
        }
    }

    shared.state.advance(WorkerState::Draining);
    abandon_pending(&shared);

    match context::uninstall::<C>() {
        Some(mut context) => context.release(),
        None => log::warn!("{label} was no longer current at worker exit"),
    }

    log::debug!("graphics worker exiting");
    Ok(())
}

fn dispatch(envelope: Envelope) {
    let seq = envelope.seq();
    let variant = envelope.variant();
    log::trace!("executing command #{seq} ({variant:?})");

    if catch_unwind(AssertUnwindSafe(|| envelope.execute())).is_err() {
        log::error!("command #{seq} ({variant:?}) panicked on graphics worker");
    }
}

/// Drops everything still queued. Waiters on synchronous envelopes are
/// released as abandoned when their envelope drops.
fn abandon_pending(shared: &Shared) {
    let pending = shared.queue.close();
    let abandoned = pending
        .iter()
        .filter(|command| matches!(command, Command::Run(_)))
        .count();

    if abandoned > 0 {
        log::warn!("graphics worker shutting down, abandoning {abandoned} queued command(s)");
    }
    drop(pending);
}
