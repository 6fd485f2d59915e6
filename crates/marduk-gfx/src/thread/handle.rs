use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{JoinHandle, ThreadId};
use std::time::Duration;

use crate::error::ThreadError;

enum Slot<T> {
    Joinable(JoinHandle<T>),
    Joined,
    Detached,
}

/// Owned handle to a named OS thread returning `T`.
///
/// Unlike a bare [`JoinHandle`], the handle survives `join` and `detach` so
/// misuse (a second join, a join after detach) is reported as an error instead
/// of being unrepresentable at the call site.
pub struct Thread<T> {
    name: String,
    id: ThreadId,
    slot: Slot<T>,
}

impl<T: Send + 'static> Thread<T> {
    /// Spawns a named thread running `entry`.
    pub fn spawn<F>(name: impl Into<String>, entry: F) -> Result<Self, ThreadError>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let name = name.into();
        let handle = std::thread::Builder::new()
            .name(name.clone())
            .spawn(entry)
            .map_err(|source| {
                log::error!("failed to spawn thread `{name}`: {source}");
                ThreadError::Spawn {
                    name: name.clone(),
                    source,
                }
            })?;

        let id = handle.thread().id();
        log::debug!("thread `{name}` created ({id:?})");

        Ok(Self {
            name,
            id,
            slot: Slot::Joinable(handle),
        })
    }
}

impl<T> Thread<T> {
    /// Blocks until the thread exits and returns its value.
    pub fn join(&mut self) -> Result<T, ThreadError> {
        match std::mem::replace(&mut self.slot, Slot::Joined) {
            Slot::Joinable(handle) => {
                // A panic payload may itself panic on drop; keep that off the joiner.
                handle.join().map_err(|payload| {
                    let _ = catch_unwind(AssertUnwindSafe(|| drop(payload)));
                    log::error!("thread `{}` panicked", self.name);
                    ThreadError::Panicked(self.name.clone())
                })
            }
            Slot::Joined => {
                log::warn!("thread `{}` joined twice", self.name);
                Err(ThreadError::AlreadyJoined(self.name.clone()))
            }
            Slot::Detached => {
                self.slot = Slot::Detached;
                log::warn!("attempt to join detached thread `{}`", self.name);
                Err(ThreadError::Detached(self.name.clone()))
            }
        }
    }

    /// Lets the thread run to completion on its own.
    ///
    /// Returns `false` if the handle was already joined or detached.
    pub fn detach(&mut self) -> bool {
        match std::mem::replace(&mut self.slot, Slot::Detached) {
            Slot::Joinable(handle) => {
                drop(handle);
                log::debug!("thread `{}` detached", self.name);
                true
            }
            Slot::Joined => {
                self.slot = Slot::Joined;
                log::warn!("attempt to detach joined thread `{}`", self.name);
                false
            }
            Slot::Detached => {
                log::warn!("thread `{}` detached twice", self.name);
                false
            }
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread body has returned. Joined handles report `true`.
    pub fn is_finished(&self) -> bool {
        match &self.slot {
            Slot::Joinable(handle) => handle.is_finished(),
            Slot::Joined => true,
            Slot::Detached => false,
        }
    }

    pub fn is_joinable(&self) -> bool {
        matches!(self.slot, Slot::Joinable(_))
    }
}

impl<T> std::fmt::Debug for Thread<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thread")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("joinable", &self.is_joinable())
            .finish()
    }
}

/// Id of the calling thread.
#[inline]
pub fn current_id() -> ThreadId {
    std::thread::current().id()
}

pub fn sleep(duration: Duration) {
    std::thread::sleep(duration);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_returns_thread_value() {
        let mut t = Thread::spawn("answer", || 42).unwrap();
        assert_eq!(t.join().unwrap(), 42);
        assert!(t.is_finished());
    }

    #[test]
    fn spawned_thread_has_distinct_id_and_name() {
        let mut t = Thread::spawn("named", || {
            (current_id(), std::thread::current().name().map(str::to_owned))
        })
        .unwrap();
        let spawned_id = t.id();
        let (id, name) = t.join().unwrap();
        assert_eq!(id, spawned_id);
        assert_ne!(id, current_id());
        assert_eq!(name.as_deref(), Some("named"));
        assert_eq!(t.name(), "named");
    }

    #[test]
    fn second_join_fails() {
        let mut t = Thread::spawn("twice", || ()).unwrap();
        t.join().unwrap();
        assert!(matches!(t.join(), Err(ThreadError::AlreadyJoined(_))));
    }

    #[test]
    fn join_after_detach_fails() {
        let mut t = Thread::spawn("detached", || ()).unwrap();
        assert!(t.detach());
        assert!(!t.detach());
        assert!(matches!(t.join(), Err(ThreadError::Detached(_))));
    }

    #[test]
    fn panicking_thread_reports_panicked() {
        let mut t = Thread::spawn("boom", || -> u32 { panic!("boom") }).unwrap();
        assert!(matches!(t.join(), Err(ThreadError::Panicked(_))));
    }
}
