//! Submission entry points.
//!
//! Four ways to hand work to the context thread, named after the command
//! variant they build:
//!
//! | entry point | returns a value | takes [`Args`] |
//! |-------------|-----------------|----------------|
//! | [`Submitter::submit_rna`] | yes | no  |
//! | [`Submitter::submit_vna`] | no  | no  |
//! | [`Submitter::submit_rwa`] | yes | yes |
//! | [`Submitter::submit_vwa`] | no  | yes |
//!
//! With `wait = true` the caller blocks until the command has run. With
//! `wait = false` the call returns as soon as the command is queued, which may
//! itself block while the queue is full.

use std::sync::Arc;
use std::thread::ThreadId;

use crate::command::{Args, Callable, Command, Envelope, MAX_ARGS, Outcome, Output, completion};
use crate::error::SubmitError;
use crate::thread::current_id;
use crate::worker::{Shared, WorkerState};

/// Cloneable handle for submitting commands to a context worker.
#[derive(Clone)]
pub struct Submitter {
    shared: Arc<Shared>,
    worker: ThreadId,
}

impl Submitter {
    pub(crate) fn new(shared: Arc<Shared>, worker: ThreadId) -> Self {
        Self { shared, worker }
    }

    /// Runs `f` on the context thread and, when `wait` is set, returns its value.
    ///
    /// Fire-and-forget submissions drop the value on the worker and return
    /// `Ok(None)`.
    pub fn submit_rna<R, F>(&self, wait: bool, f: F) -> Result<Option<R>, SubmitError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let callable = Callable::ReturnNoArgs(Box::new(move || Box::new(f()) as Output));
        self.submit(wait, callable)?.map(downcast).transpose()
    }

    /// Runs `f` on the context thread.
    pub fn submit_vna<F>(&self, wait: bool, f: F) -> Result<(), SubmitError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(wait, Callable::VoidNoArgs(Box::new(f))).map(drop)
    }

    /// Runs `f(args)` on the context thread and, when `wait` is set, returns its
    /// value. `args` is moved into the command.
    pub fn submit_rwa<R, F>(&self, wait: bool, f: F, args: Args) -> Result<Option<R>, SubmitError>
    where
        F: FnOnce(Args) -> R + Send + 'static,
        R: Send + 'static,
    {
        check_argc(&args)?;
        let callable = Callable::ReturnWithArgs(Box::new(move |args| Box::new(f(args)) as Output), args);
        self.submit(wait, callable)?.map(downcast).transpose()
    }

    /// Runs `f(args)` on the context thread.
    pub fn submit_vwa<F>(&self, wait: bool, f: F, args: Args) -> Result<(), SubmitError>
    where
        F: FnOnce(Args) + Send + 'static,
    {
        check_argc(&args)?;
        self.submit(wait, Callable::VoidWithArgs(Box::new(f), args)).map(drop)
    }

    /// Whether the caller is the context worker itself.
    #[inline]
    pub fn is_worker_thread(&self) -> bool {
        current_id() == self.worker
    }

    /// Commands queued but not yet picked up by the worker.
    pub fn pending(&self) -> usize {
        self.shared.queue.len()
    }

    pub fn capacity(&self) -> u16 {
        self.shared.queue.capacity()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.shared.state.get()
    }

    fn submit(&self, wait: bool, callable: Callable) -> Result<Option<Output>, SubmitError> {
        if self.shared.is_stopping() {
            log::debug!("submission rejected, graphics worker is shutting down");
            return Err(SubmitError::ShutDown);
        }

        let seq = self.shared.next_seq();

        // Queuing from the worker and waiting on it would never return.
        if self.is_worker_thread() {
            log::trace!("command #{seq} submitted from the graphics worker, running inline");
            return self.run_inline(seq, wait, callable);
        }

        if !wait {
            let envelope = Envelope::new(seq, callable, None);
            log::trace!("queuing {envelope:?}");
            return self
                .shared
                .queue
                .push(Command::Run(envelope))
                .map(|()| None)
                .map_err(|_| SubmitError::ShutDown);
        }

        let (completer, completion) = completion();
        let envelope = Envelope::new(seq, callable, Some(completer));
        log::trace!("queuing {envelope:?}");

        let guard = completion.lock();
        if let Err(err) = self.shared.queue.push(Command::Run(envelope)) {
            // Dropping the envelope fires the completer, which needs the slot.
            drop(guard);
            drop(err);
            return Err(SubmitError::ShutDown);
        }

        match completion.wait(guard) {
            Outcome::Done(result) => Ok(result),
            Outcome::Abandoned => {
                log::debug!("command #{seq} was abandoned");
                Err(SubmitError::Abandoned)
            }
        }
    }

    fn run_inline(&self, seq: u64, wait: bool, callable: Callable) -> Result<Option<Output>, SubmitError> {
        if !wait {
            Envelope::new(seq, callable, None).execute();
            return Ok(None);
        }

        let (completer, completion) = completion();
        Envelope::new(seq, callable, Some(completer)).execute();
        match completion.wait(completion.lock()) {
            Outcome::Done(result) => Ok(result),
            Outcome::Abandoned => Err(SubmitError::Abandoned),
        }
    }
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("worker", &self.worker)
            .field("state", &self.worker_state())
            .field("pending", &self.pending())
            .finish()
    }
}

fn check_argc(args: &Args) -> Result<(), SubmitError> {
    if args.len() > MAX_ARGS {
        log::error!("command submitted with {} arguments (max {MAX_ARGS})", args.len());
        return Err(SubmitError::TooManyArgs { count: args.len() });
    }
    Ok(())
}

fn downcast<R: 'static>(output: Output) -> Result<R, SubmitError> {
    output
        .downcast::<R>()
        .map(|value| *value)
        .map_err(|_| SubmitError::ResultType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, Instant};

    use crate::context::{NullContext, with_current};
    use crate::thread::{Mutex, Thread, sleep};
    use crate::worker::{ContextWorker, WorkerConfig};

    fn worker() -> ContextWorker {
        crate::logging::init_test_logging();
        ContextWorker::spawn(WorkerConfig::default().with_queue_capacity(16), NullContext::default()).unwrap()
    }

    // ── ordering ──────────────────────────────────────────────────────────

    #[test]
    fn single_producer_commands_run_in_submission_order() {
        let worker = worker();
        let gfx = worker.submitter();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50usize {
            let order = Arc::clone(&order);
            gfx.submit_vwa(
                false,
                move |mut args| order.lock().push(args.take::<usize>(0).unwrap_or(usize::MAX)),
                Args::new().with(i),
            )
            .unwrap();
        }
        gfx.submit_vna(true, || {}).unwrap();

        assert_eq!(*order.lock(), (0..50).collect::<Vec<_>>());
        worker.shutdown().unwrap();
    }

    #[test]
    fn each_producer_keeps_its_own_order() {
        let worker = worker();
        let order = Arc::new(Mutex::new(Vec::new()));

        let mut producers: Vec<_> = (0..3)
            .map(|p| {
                let gfx = worker.submitter();
                let order = Arc::clone(&order);
                Thread::spawn(format!("producer-{p}"), move || {
                    for i in 0..20 {
                        let order = Arc::clone(&order);
                        gfx.submit_vna(false, move || order.lock().push((p, i))).unwrap();
                    }
                })
                .unwrap()
            })
            .collect();
        for producer in &mut producers {
            producer.join().unwrap();
        }
        worker.submitter().submit_vna(true, || {}).unwrap();

        let order = order.lock();
        assert_eq!(order.len(), 60);
        for p in 0..3 {
            let seen: Vec<_> = order.iter().filter(|(q, _)| *q == p).map(|(_, i)| *i).collect();
            assert_eq!(seen, (0..20).collect::<Vec<_>>());
        }
        drop(order);
        worker.shutdown().unwrap();
    }

    // ── synchronous results ───────────────────────────────────────────────

    #[test]
    fn sync_rwa_returns_value_computed_on_worker() {
        let worker = worker();
        let gfx = worker.submitter();

        let doubled = gfx
            .submit_rwa(
                true,
                |args| {
                    let touches = with_current(|ctx: &mut NullContext| ctx.touch()).unwrap_or(0);
                    (args.get::<i32>(0).copied().unwrap_or(0) * 2, touches)
                },
                Args::new().with(21),
            )
            .unwrap();

        assert_eq!(doubled, Some((42, 1)));
        worker.shutdown().unwrap();
    }

    #[test]
    fn sync_void_returns_after_command_ran() {
        let worker = worker();
        let gfx = worker.submitter();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        gfx.submit_vna(true, move || {
            sleep(Duration::from_millis(20));
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let h = Arc::clone(&hits);
        gfx.submit_vwa(
            true,
            move |args| {
                h.fetch_add(args.len(), Ordering::SeqCst);
            },
            Args::new().with(1u8).with(2u8),
        )
        .unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 3);
        worker.shutdown().unwrap();
    }

    #[test]
    fn async_return_discards_value() {
        let worker = worker();
        let gfx = worker.submitter();
        assert_eq!(gfx.submit_rna(false, || 5), Ok(None));
        assert_eq!(gfx.submit_rwa(false, |args| args.len(), Args::new()), Ok(None));
        worker.shutdown().unwrap();
    }

    // ── asynchronous submission ───────────────────────────────────────────

    #[test]
    fn async_submit_does_not_wait_for_execution() {
        let worker = worker();
        let gfx = worker.submitter();
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        let started = Instant::now();
        gfx.submit_vna(false, move || {
            sleep(Duration::from_millis(300));
            h.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(started.elapsed() < Duration::from_millis(150));
        assert_eq!(hits.load(Ordering::SeqCst), 0);

        gfx.submit_vna(true, || {}).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        worker.shutdown().unwrap();
    }

    // ── submissions from the worker ───────────────────────────────────────

    #[test]
    fn submit_from_worker_runs_inline() {
        let worker = worker();
        let gfx = worker.submitter();
        assert!(!gfx.is_worker_thread());

        let inner = gfx.clone();
        let result = gfx
            .submit_rna(true, move || {
                let nested = inner.submit_rna(true, || 5).unwrap();
                (inner.is_worker_thread(), nested)
            })
            .unwrap();

        assert_eq!(result, Some((true, Some(5))));
        worker.shutdown().unwrap();
    }

    // ── argument limits ───────────────────────────────────────────────────

    #[test]
    fn too_many_args_is_rejected_before_queuing() {
        let worker = worker();
        let gfx = worker.submitter();

        let mut args = Args::new();
        for i in 0..=MAX_ARGS {
            args.push(i);
        }
        assert_eq!(
            gfx.submit_vwa(true, |_| {}, args),
            Err(SubmitError::TooManyArgs { count: MAX_ARGS + 1 })
        );
        assert_eq!(gfx.pending(), 0);
        worker.shutdown().unwrap();
    }

    #[test]
    fn downcast_mismatch_is_a_result_type_error() {
        assert_eq!(downcast::<u32>(Box::new(1u32)), Ok(1));
        assert_eq!(downcast::<u32>(Box::new("nope")), Err(SubmitError::ResultType));
    }
}
