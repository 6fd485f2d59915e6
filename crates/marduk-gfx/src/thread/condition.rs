use std::sync::Condvar;
use std::time::Duration;

use super::mutex::{Mutex, MutexGuard};

/// Outcome of [`Condition::wait_timeout`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WaitStatus {
    Signaled,
    TimedOut,
}

/// Condition variable paired with a [`Mutex`].
///
/// Waits atomically release the guard and re-acquire it before returning.
/// Spurious wakeups are possible; callers re-check their predicate in a loop
/// or use [`wait_while`](Self::wait_while).
#[derive(Debug, Default)]
pub struct Condition {
    inner: Condvar,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wait<'a, T>(&self, guard: MutexGuard<'a, T>) -> MutexGuard<'a, T> {
        self.inner.wait(guard).unwrap_or_else(|poisoned| {
            log::warn!("recovering poisoned mutex after condition wait");
            poisoned.into_inner()
        })
    }

    /// Waits until `condition` returns `false`.
    pub fn wait_while<'a, T, F>(&self, mut guard: MutexGuard<'a, T>, mut condition: F) -> MutexGuard<'a, T>
    where
        F: FnMut(&mut T) -> bool,
    {
        while condition(&mut *guard) {
            guard = self.wait(guard);
        }
        guard
    }

    /// Like [`wait`](Self::wait) but gives up after `timeout`.
    pub fn wait_timeout<'a, T>(
        &self,
        guard: MutexGuard<'a, T>,
        timeout: Duration,
    ) -> (MutexGuard<'a, T>, WaitStatus) {
        let (guard, result) = self.inner.wait_timeout(guard, timeout).unwrap_or_else(|poisoned| {
            log::warn!("recovering poisoned mutex after timed condition wait");
            poisoned.into_inner()
        });

        let status = if result.timed_out() {
            WaitStatus::TimedOut
        } else {
            WaitStatus::Signaled
        };
        (guard, status)
    }

    /// Wakes at most one waiter.
    #[inline]
    pub fn signal(&self) {
        self.inner.notify_one();
    }

    /// Wakes every waiter.
    #[inline]
    pub fn broadcast(&self) {
        self.inner.notify_all();
    }

    /// Locks `mutex`, applies `update`, then signals one waiter.
    pub fn signal_with<T>(&self, mutex: &Mutex<T>, update: impl FnOnce(&mut T)) {
        let mut guard = mutex.lock();
        update(&mut guard);
        self.signal();
        Mutex::unlock(guard);
    }
}
