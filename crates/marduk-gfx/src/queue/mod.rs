//! Bounded blocking command queue.
//!
//! Producers block in [`CommandQueue::push`] while the queue is full; this is
//! the only backpressure in the system. A single consumer sees items in exact
//! push order. Closing the queue hands the remaining items to the closer and
//! wakes everyone: blocked producers get their item back, a blocked consumer
//! gets `None`.

mod ring;

use std::time::{Duration, Instant};

use crate::error::{OfferError, PushError, QueueError};
use crate::thread::{Condition, Mutex, WaitStatus};

use ring::Ring;

struct State<T> {
    ring: Ring<T>,
    closed: bool,
}

/// Fixed-capacity, thread-safe FIFO.
pub struct CommandQueue<T> {
    state: Mutex<State<T>>,
    not_empty: Condition,
    not_full: Condition,
    capacity: u16,
}

impl<T> CommandQueue<T> {
    /// Allocates storage for `capacity` items.
    pub fn new(capacity: u16) -> Result<Self, QueueError> {
        if capacity == 0 {
            log::error!("attempt to create a command queue with capacity 0");
            return Err(QueueError::ZeroCapacity);
        }

        Ok(Self {
            state: Mutex::new(State {
                ring: Ring::with_capacity(capacity as usize),
                closed: false,
            }),
            not_empty: Condition::new(),
            not_full: Condition::new(),
            capacity,
        })
    }

    /// Appends `item`, waiting for a free slot while the queue is full.
    pub fn push(&self, item: T) -> Result<(), PushError<T>> {
        let mut state = self.state.lock();

        if state.ring.is_full() && !state.closed {
            log::debug!("command queue full (capacity {}), producer waiting for a slot", self.capacity);
            state = self.not_full.wait_while(state, |s| s.ring.is_full() && !s.closed);
        }

        if state.closed {
            return Err(PushError::Closed(item));
        }

        state.ring.push_back(item);
        self.not_empty.signal();
        Ok(())
    }

    /// Appends `item` only if a slot is free right now.
    pub fn offer(&self, item: T) -> Result<(), OfferError<T>> {
        let mut state = self.state.lock();

        if state.closed {
            return Err(OfferError::Closed(item));
        }
        if state.ring.is_full() {
            log::warn!("command queue full (capacity {}), offer rejected", self.capacity);
            return Err(OfferError::Full(item));
        }

        state.ring.push_back(item);
        self.not_empty.signal();
        Ok(())
    }

    /// Removes the oldest item, waiting while the queue is empty.
    ///
    /// Returns `None` only once the queue is closed and empty.
    pub fn pop(&self) -> Option<T> {
        let state = self.state.lock();
        let mut state = self.not_empty.wait_while(state, |s| s.ring.is_empty() && !s.closed);

        let item = state.ring.pop_front();
        if item.is_some() {
            self.not_full.signal();
        }
        item
    }

    /// Removes the oldest item without waiting.
    pub fn try_pop(&self) -> Option<T> {
        let mut state = self.state.lock();
        let item = state.ring.pop_front();
        if item.is_some() {
            self.not_full.signal();
        }
        item
    }

    /// Like [`pop`](Self::pop) but gives up after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();

        while state.ring.is_empty() && !state.closed {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return None;
            }
            let (guard, status) = self.not_empty.wait_timeout(state, remaining);
            state = guard;
            if status == WaitStatus::TimedOut && state.ring.is_empty() {
                return None;
            }
        }

        let item = state.ring.pop_front();
        if item.is_some() {
            self.not_full.signal();
        }
        item
    }

    /// Runs `f` on the oldest item without removing it.
    pub fn peek_with<R>(&self, f: impl FnOnce(Option<&T>) -> R) -> R {
        let state = self.state.lock();
        f(state.ring.front())
    }

    /// Removes every queued item and wakes blocked producers.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();
        let items = state.ring.drain();
        self.not_full.broadcast();
        items
    }

    /// Rejects further pushes and returns the items still queued.
    ///
    /// Blocked producers wake with [`PushError::Closed`]; a blocked consumer
    /// wakes with `None`. Closing twice returns an empty vector.
    pub fn close(&self) -> Vec<T> {
        let mut state = self.state.lock();
        state.closed = true;
        let items = state.ring.drain();
        self.not_full.broadcast();
        self.not_empty.broadcast();
        items
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn len(&self) -> usize {
        self.state.lock().ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.state.lock().ring.is_full()
    }

    #[inline]
    pub fn capacity(&self) -> u16 {
        self.capacity
    }
}

impl<T> Drop for CommandQueue<T> {
    fn drop(&mut self) {
        let dangling = self.state.lock().ring.len();
        if dangling > 0 {
            log::warn!("command queue destroyed with {dangling} dangling item(s); they will not run");
        }
    }
}

impl<T> std::fmt::Debug for CommandQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("CommandQueue")
            .field("len", &state.ring.len())
            .field("capacity", &self.capacity)
            .field("closed", &state.closed)
            .finish()
    }
}
