//! Error types for queue construction and the bounded-wait operations.

use std::fmt;
use thiserror::Error;

/// Errors raised when building a queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Capacity was zero, negative or not representable as `usize`.
    #[error("invalid capacity {requested}: a queue needs at least one slot")]
    InvalidCapacity {
        /// The capacity the caller asked for, as written.
        requested: String,
    },

    /// Slot storage for a valid capacity could not be allocated.
    #[error("cannot allocate {requested} slots")]
    AllocationFailed {
        /// Number of slots that were asked for.
        requested: usize,
    },
}

/// A push that did not happen. The rejected item is always handed back.
#[derive(Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError<T> {
    /// Every slot is occupied.
    #[error("queue is full")]
    Full(T),

    /// No slot freed up before the deadline.
    #[error("timed out waiting for a free slot")]
    Timeout(T),

    /// The queue has been shut down.
    #[error("queue has been shut down")]
    ShutDown(T),
}

impl<T> PushError<T> {
    /// Returns the item that could not be pushed.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Self::Full(item) | Self::Timeout(item) | Self::ShutDown(item) => item,
        }
    }

    /// Returns `true` if retrying later may succeed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Full(_) | Self::Timeout(_))
    }

    /// Returns `true` if the queue will never accept this push.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutDown(_))
    }
}

// Manual impl so `PushError<T>` is `Debug` (and thus an `Error`) for any `T`.
impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Full(_) => "Full",
            Self::Timeout(_) => "Timeout",
            Self::ShutDown(_) => "ShutDown",
        };
        f.debug_tuple(name).finish_non_exhaustive()
    }
}

/// A pop that did not return an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PopError {
    /// No item is available.
    #[error("queue is empty")]
    Empty,

    /// No item arrived before the deadline.
    #[error("timed out waiting for an item")]
    Timeout,

    /// The queue has been shut down and fully drained.
    #[error("queue has been shut down")]
    ShutDown,
}

impl PopError {
    /// Returns `true` if retrying later may succeed.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Empty | Self::Timeout)
    }

    /// Returns `true` if no further item will ever be returned.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::ShutDown)
    }
}
