//! Shutdown handle for stopping worker loops.

use crate::queue::Shared;
use crate::sync::Arc;

/// A cloneable signal for shutting a queue down from another thread.
///
/// Triggering it wakes every thread parked in the queue. Interruptible and
/// timed pushes then fail with the item handed back, and interruptible pops
/// drain the remaining items before reporting `ShutDown`. This lets
/// `loop { queue.pop_interruptible()? }` style workers exit cleanly instead of
/// relying on process termination.
///
/// Multiple clones can trigger shutdown; only the first call has an effect.
///
/// # Example
///
/// ```
/// use ringbound::{BoundedQueue, PopError};
/// use std::thread;
///
/// let queue = BoundedQueue::<u32>::new(8).unwrap();
/// let signal = queue.shutdown_signal();
///
/// let worker = {
///     let queue = queue.clone();
///     thread::spawn(move || {
///         let mut seen = 0;
///         while queue.pop_interruptible().is_ok() {
///             seen += 1;
///         }
///         seen
///     })
/// };
///
/// queue.push(1);
/// queue.push(2);
/// signal.shutdown();
///
/// assert_eq!(worker.join().unwrap(), 2);
/// assert_eq!(queue.try_pop(), Err(PopError::ShutDown));
/// ```
pub struct ShutdownSignal<T> {
    shared: Arc<Shared<T>>,
}

impl<T> ShutdownSignal<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self { shared }
    }

    /// Shuts the queue down and wakes every parked thread.
    ///
    /// This method is idempotent.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    /// Returns `true` if shutdown has been initiated.
    pub fn is_shutdown(&self) -> bool {
        self.shared.is_shutdown()
    }
}

impl<T> Clone for ShutdownSignal<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> std::fmt::Debug for ShutdownSignal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShutdownSignal")
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}
