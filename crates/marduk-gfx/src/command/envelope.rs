use std::fmt;

use super::completion::Completer;
use super::{Args, Output};

/// Signature kind of a command.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Variant {
    ReturnNoArgs,
    VoidNoArgs,
    ReturnWithArgs,
    VoidWithArgs,
}

impl Variant {
    #[inline]
    pub fn returns(self) -> bool {
        matches!(self, Self::ReturnNoArgs | Self::ReturnWithArgs)
    }

    #[inline]
    pub fn takes_args(self) -> bool {
        matches!(self, Self::ReturnWithArgs | Self::VoidWithArgs)
    }
}

pub(crate) enum Callable {
    ReturnNoArgs(Box<dyn FnOnce() -> Output + Send>),
    VoidNoArgs(Box<dyn FnOnce() + Send>),
    ReturnWithArgs(Box<dyn FnOnce(Args) -> Output + Send>, Args),
    VoidWithArgs(Box<dyn FnOnce(Args) + Send>, Args),
}

/// One queued unit of work. Consumed exactly once by [`Envelope::execute`].
pub struct Envelope {
    seq: u64,
    callable: Callable,
    completer: Option<Completer>,
}

impl Envelope {
    pub(crate) fn new(seq: u64, callable: Callable, completer: Option<Completer>) -> Self {
        Self {
            seq,
            callable,
            completer,
        }
    }

    /// Submission sequence number, for diagnostics.
    #[inline]
    pub(crate) fn seq(&self) -> u64 {
        self.seq
    }

    pub(crate) fn variant(&self) -> Variant {
        match &self.callable {
            Callable::ReturnNoArgs(_) => Variant::ReturnNoArgs,
            Callable::VoidNoArgs(_) => Variant::VoidNoArgs,
            Callable::ReturnWithArgs(..) => Variant::ReturnWithArgs,
            Callable::VoidWithArgs(..) => Variant::VoidWithArgs,
        }
    }

    /// Whether a submitting thread is blocked on this envelope.
    #[inline]
    pub(crate) fn wait(&self) -> bool {
        self.completer.is_some()
    }

    /// Number of arguments carried; zero for `*NoArgs` variants.
    pub(crate) fn argc(&self) -> u8 {
        match &self.callable {
            Callable::ReturnWithArgs(_, args) | Callable::VoidWithArgs(_, args) => args.argc(),
            Callable::ReturnNoArgs(_) | Callable::VoidNoArgs(_) => 0,
        }
    }

    /// Runs the callable on the current thread and releases the waiter, if any.
    ///
    /// For fire-and-forget envelopes the result is dropped here. If the
    /// callable panics the completer is dropped during unwinding, which
    /// releases the waiter as abandoned.
    pub(crate) fn execute(self) {
        let Self {
            seq,
            callable,
            completer,
        } = self;

        let result = match callable {
            Callable::ReturnNoArgs(f) => Some(f()),
            Callable::VoidNoArgs(f) => {
                f();
                None
            }
            Callable::ReturnWithArgs(f, args) => Some(f(args)),
            Callable::VoidWithArgs(f, args) => {
                f(args);
                None
            }
        };

        match completer {
            Some(completer) => {
                log::trace!("command #{seq} done, signaling waiter");
                completer.complete(result);
            }
            None => log::trace!("command #{seq} done"),
        }
    }
}

impl fmt::Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("seq", &self.seq)
            .field("variant", &self.variant())
            .field("argc", &self.argc())
            .field("wait", &self.wait())
            .finish()
    }
}

/// Item carried by the command queue.
#[derive(Debug)]
pub enum Command {
    Run(Envelope),
    /// Sentinel: stop the worker loop.
    Terminate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Outcome, completion};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sum_args(args: Args) -> Output {
        let a = args.get::<i32>(0).copied().unwrap_or(0);
        let b = args.get::<i32>(1).copied().unwrap_or(0);
        Box::new(a + b)
    }

    #[test]
    fn variant_and_argc_follow_callable() {
        let e = Envelope::new(1, Callable::VoidNoArgs(Box::new(|| {})), None);
        assert_eq!(e.variant(), Variant::VoidNoArgs);
        assert_eq!(e.argc(), 0);
        assert!(!e.wait());

        let (completer, _completion) = completion();
        let e = Envelope::new(
            2,
            Callable::ReturnWithArgs(Box::new(sum_args), Args::new().with(1).with(2)),
            Some(completer),
        );
        assert_eq!(e.variant(), Variant::ReturnWithArgs);
        assert!(e.variant().returns() && e.variant().takes_args());
        assert_eq!(e.argc(), 2);
        assert!(e.wait());
    }

    #[test]
    fn execute_stores_result_for_waiter() {
        let (completer, completion) = completion();
        let e = Envelope::new(
            3,
            Callable::ReturnWithArgs(Box::new(sum_args), Args::new().with(40).with(2)),
            Some(completer),
        );

        let guard = completion.lock();
        let mut runner = crate::thread::Thread::spawn("runner", move || e.execute()).unwrap();
        match completion.wait(guard) {
            Outcome::Done(Some(value)) => assert_eq!(value.downcast_ref::<i32>(), Some(&42)),
            _ => panic!("expected a result"),
        }
        runner.join().unwrap();
    }

    #[test]
    fn void_variants_run_once_without_result() {
        let hits = Arc::new(AtomicUsize::new(0));

        let h = Arc::clone(&hits);
        Envelope::new(4, Callable::VoidNoArgs(Box::new(move || {
            h.fetch_add(1, Ordering::SeqCst);
        })), None)
        .execute();

        let h = Arc::clone(&hits);
        let (completer, completion) = completion();
        Envelope::new(
            5,
            Callable::VoidWithArgs(
                Box::new(move |args| {
                    h.fetch_add(args.len(), Ordering::SeqCst);
                }),
                Args::new().with(()).with(()),
            ),
            Some(completer),
        )
        .execute();

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        let guard = completion.lock();
        assert!(matches!(completion.wait(guard), Outcome::Done(None)));
    }

    #[test]
    fn dropping_unexecuted_envelope_abandons_waiter() {
        let (completer, completion) = completion();
        let e = Envelope::new(6, Callable::ReturnNoArgs(Box::new(|| Box::new(1u8) as Output)), Some(completer));
        drop(Command::Run(e));
        let guard = completion.lock();
        assert!(matches!(completion.wait(guard), Outcome::Abandoned));
    }
}
