//! The context worker.
//!
//! One dedicated thread owns the rendering context for its whole life and
//! drains the command queue. Nothing else in the engine touches the context.

mod config;
mod run;
mod shared;
mod state;

use std::sync::Arc;
use std::thread::ThreadId;

use anyhow::{Context, Result, anyhow};

use crate::command::Command;
use crate::context::RenderContext;
use crate::queue::CommandQueue;
use crate::submit::Submitter;
use crate::thread::Thread;

pub use config::{QUEUE_CAPACITY_ENV, WorkerConfig};
pub use state::WorkerState;

pub(crate) use shared::Shared;

/// Owner of the context worker thread.
///
/// Hand [`Submitter`]s to producers; keep this handle wherever the engine
/// shuts down. Dropping it without calling [`shutdown`](Self::shutdown) shuts
/// the worker down anyway.
pub struct ContextWorker {
    shared: Arc<Shared>,
    thread: Thread<Result<()>>,
    label: String,
}

impl ContextWorker {
    /// Starts the worker and moves `context` onto it.
    ///
    /// Returns once the context is current on the worker thread. A failure to
    /// create the thread or to activate the context is returned as an error;
    /// callers treat it as fatal.
    pub fn spawn<C: RenderContext>(config: WorkerConfig, context: C) -> Result<Self> {
        let queue = CommandQueue::new(config.queue_capacity).context("invalid graphics worker configuration")?;
        let shared = Arc::new(Shared::new(queue));
        let label = context.label().to_owned();

        let mut thread = Thread::spawn(config.thread_name.clone(), {
            let shared = Arc::clone(&shared);
            move || run::run(shared, context)
        })
        .with_context(|| format!("failed to start graphics worker for {label}"))?;

        if shared.state.wait_started() != WorkerState::Running {
            let err = match thread.join() {
                Ok(Err(err)) => err,
                Ok(Ok(())) => anyhow!("graphics worker exited during startup"),
                Err(err) => anyhow::Error::new(err),
            };
            return Err(err);
        }

        log::info!(
            "graphics worker `{}` running {label} (queue capacity {})",
            config.thread_name,
            config.queue_capacity
        );

        Ok(Self { shared, thread, label })
    }

    /// Returns a new handle for submitting commands.
    pub fn submitter(&self) -> Submitter {
        Submitter::new(Arc::clone(&self.shared), self.thread.id())
    }

    pub fn state(&self) -> WorkerState {
        self.shared.state.get()
    }

    /// Id of the thread that owns the rendering context.
    pub fn thread_id(&self) -> ThreadId {
        self.thread.id()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Asks the worker to stop without waiting for it.
    ///
    /// The worker finishes the command it is running, then abandons whatever
    /// is still queued. New submissions fail with
    /// [`SubmitError::ShutDown`](crate::SubmitError::ShutDown). Idempotent.
    pub fn stop(&self) {
        if !self.shared.request_stop() {
            return;
        }
        log::debug!("stopping graphics worker for {}", self.label);

        // Wakes an idle worker. A full queue means the worker is busy and will
        // see the flag before its next pop.
        if let Err(err) = self.shared.queue.offer(Command::Terminate) {
            log::debug!("terminate command not queued: {err}");
        }
    }

    /// Waits for the worker thread to exit and returns its result.
    ///
    /// Does not ask the worker to stop; pair with [`stop`](Self::stop) or use
    /// [`shutdown`](Self::shutdown). Joining twice is a no-op.
    pub fn join(&mut self) -> Result<()> {
        if !self.thread.is_joinable() {
            return Ok(());
        }

        let result = self.thread.join()?;
        log::info!("graphics worker for {} terminated", self.label);
        result
    }

    /// Stops the worker and waits for it to exit.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop();
        self.join()
    }
}

impl Drop for ContextWorker {
    fn drop(&mut self) {
        if !self.thread.is_joinable() {
            return;
        }

        self.stop();
        if let Err(err) = self.join() {
            log::error!("graphics worker shutdown failed: {err:#}");
        }
    }
}

impl std::fmt::Debug for ContextWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextWorker")
            .field("label", &self.label)
            .field("thread", &self.thread)
            .field("state", &self.state())
            .field("pending", &self.shared.queue.len())
            .finish()
    }
}
