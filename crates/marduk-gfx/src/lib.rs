//! Marduk graphics thread.
//!
//! Every graphics-API call in the engine runs on one dedicated thread that owns
//! the rendering context. Other threads reach that thread through a bounded
//! command queue and the submission entry points on [`Submitter`].
//!
//! ```no_run
//! use marduk_gfx::{Args, ContextWorker, NullContext, WorkerConfig};
//!
//! # fn main() -> anyhow::Result<()> {
//! let worker = ContextWorker::spawn(WorkerConfig::default(), NullContext::default())?;
//! let gfx = worker.submitter();
//!
//! let doubled = gfx.submit_rwa(true, |args| args.get::<i32>(0).copied().unwrap_or(0) * 2, Args::new().with(21))?;
//! assert_eq!(doubled, Some(42));
//!
//! worker.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod context;
pub mod error;
pub mod logging;
pub mod queue;
pub mod submit;
pub mod thread;
pub mod worker;

pub use command::{Args, MAX_ARGS, Variant};
pub use context::{NullContext, RenderContext, with_current};
pub use error::{ContextError, OfferError, PushError, QueueError, SubmitError, ThreadError};
pub use queue::CommandQueue;
pub use submit::Submitter;
pub use worker::{ContextWorker, WorkerConfig, WorkerState};
