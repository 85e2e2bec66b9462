//! Error types for the accumulator harness.

use ringbound::QueueError;
use thiserror::Error;

/// Errors that can occur while starting or stopping a run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The queue could not be built (e.g. capacity < 1).
    #[error("queue construction failed: {0}")]
    Queue(#[from] QueueError),

    /// The producer value range contains no values.
    #[error("value range {start}..={end} is empty")]
    EmptyValueRange {
        /// Lower bound as configured.
        start: i64,
        /// Upper bound as configured.
        end: i64,
    },

    /// `producers + consumers` does not fit in a `usize`.
    #[error("too many workers: {producers} producers + {consumers} consumers")]
    TooManyWorkers {
        /// Requested producer count.
        producers: usize,
        /// Requested consumer count.
        consumers: usize,
    },

    /// The OS refused to spawn a worker thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// A worker thread panicked before it could be joined.
    #[error("worker {name} panicked")]
    WorkerPanicked {
        /// Thread name of the failed worker.
        name: String,
    },
}
