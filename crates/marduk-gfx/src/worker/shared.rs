use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::command::Command;
use crate::queue::CommandQueue;

use super::state::StateCell;

/// State shared by the worker thread, its owner, and every submitter.
pub(crate) struct Shared {
    pub(crate) queue: CommandQueue<Command>,
    pub(crate) state: StateCell,
    stopping: AtomicBool,
    next_seq: AtomicU64,
}

impl Shared {
    pub(crate) fn new(queue: CommandQueue<Command>) -> Self {
        Self {
            queue,
            state: StateCell::new(),
            stopping: AtomicBool::new(false),
            next_seq: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn next_seq(&self) -> u64 {
        self.next_seq.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::Acquire)
    }

    /// Raises the stop flag. Returns `true` for the first caller only.
    pub(crate) fn request_stop(&self) -> bool {
        !self.stopping.swap(true, Ordering::AcqRel)
    }
}
