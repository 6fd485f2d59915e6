//! Thread primitives.
//!
//! Thin wrappers over the standard library that give the queue and the worker
//! one vocabulary: named threads with checked join/detach, a mutex whose
//! poisoning is recovered instead of propagated, and a condition variable with
//! explicit signal/broadcast and timed waits.

mod condition;
mod handle;
mod mutex;

pub use condition::{Condition, WaitStatus};
pub use handle::{Thread, current_id, sleep};
pub use mutex::{Mutex, MutexGuard};
