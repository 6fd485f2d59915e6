//! Error types for the graphics thread.
//!
//! Startup and context activation use `anyhow`; everything a caller can react
//! to at runtime has a typed error here.

use std::fmt;

/// Failure of a thread primitive operation.
#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    /// The OS refused to create the thread.
    #[error("failed to spawn thread `{name}`: {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
    /// `join` was called on a handle that was already joined.
    #[error("thread `{0}` was already joined")]
    AlreadyJoined(String),
    /// `join` was called on a detached handle.
    #[error("thread `{0}` is detached and cannot be joined")]
    Detached(String),
    /// The thread unwound instead of returning.
    #[error("thread `{0}` panicked")]
    Panicked(String),
}

/// Failure to construct a [`CommandQueue`](crate::queue::CommandQueue).
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("command queue capacity must be greater than zero")]
    ZeroCapacity,
}

/// Blocking push rejected; the item is handed back.
#[derive(thiserror::Error)]
pub enum PushError<T> {
    #[error("command queue is closed")]
    Closed(T),
}

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Closed(item) => item,
        }
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Non-blocking push rejected; the item is handed back.
#[derive(thiserror::Error)]
pub enum OfferError<T> {
    #[error("command queue is full")]
    Full(T),
    #[error("command queue is closed")]
    Closed(T),
}

impl<T> OfferError<T> {
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Closed(item) => item,
        }
    }
}

impl<T> fmt::Debug for OfferError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full(_) => f.write_str("Full(..)"),
            Self::Closed(_) => f.write_str("Closed(..)"),
        }
    }
}

/// Failure of a submission entry point.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum SubmitError {
    /// The worker has been asked to stop or has already exited.
    #[error("graphics worker is shut down")]
    ShutDown,
    /// More arguments than an envelope can carry.
    #[error("too many command arguments ({count}, max {max})", max = crate::command::MAX_ARGS)]
    TooManyArgs { count: usize },
    /// The command was dropped before it ran (shutdown drain or a panic).
    #[error("command was abandoned before completion")]
    Abandoned,
    /// The worker produced a value of an unexpected type.
    #[error("command result has an unexpected type")]
    ResultType,
}

/// Failure to reach the rendering context from a command.
#[derive(Debug, Clone, Copy, Eq, PartialEq, thiserror::Error)]
pub enum ContextError {
    /// No context is installed on the calling thread.
    #[error("no rendering context is current on this thread")]
    NotCurrent,
    /// The context is already borrowed further up the stack.
    #[error("rendering context is already borrowed")]
    Busy,
    /// The installed context is not of the requested type.
    #[error("rendering context has a different type")]
    WrongType,
}
