//! Rendering context ownership.
//!
//! A [`RenderContext`] is moved into the worker thread, activated there, and
//! parked in a thread-local slot for the worker's lifetime. Commands reach it
//! through [`with_current`], which fails on every other thread. Context
//! affinity therefore holds by construction: no other thread can name the
//! context once the worker owns it.

mod current;
mod null;

pub use current::{is_current, with_current};
pub use null::NullContext;

pub(crate) use current::{install, uninstall};

use std::any::Any;

/// A graphics context that must only be used from one thread.
pub trait RenderContext: Any + Send {
    /// Binds the context to the calling thread.
    ///
    /// Called once, on the worker thread, before any command runs. An error
    /// aborts worker startup.
    fn make_current(&mut self) -> anyhow::Result<()>;

    /// Unbinds the context. Called once, on the worker thread, after the last
    /// command.
    fn release(&mut self) {}

    /// Human-readable name for logs.
    fn label(&self) -> &str {
        "render context"
    }
}
