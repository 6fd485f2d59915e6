//! Command envelopes.
//!
//! An [`Envelope`] is one unit of work for the context thread: a type-erased
//! callable tagged with its [`Variant`], the owned arguments for `*WithArgs`
//! variants, and for synchronous submissions the worker half of a one-shot
//! completion. The queue carries [`Command`]s, which are either an envelope or
//! the terminate sentinel.

mod args;
mod completion;
mod envelope;

use std::any::Any;

pub use args::{Args, MAX_ARGS};
pub use envelope::{Command, Envelope, Variant};

pub(crate) use completion::{Outcome, completion};
pub(crate) use envelope::Callable;

/// Type-erased return value of a `Return*` command.
pub type Output = Box<dyn Any + Send>;
