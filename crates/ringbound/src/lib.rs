//! ringbound - Bounded Blocking MPMC Ring Buffer
//!
//! A fixed-capacity circular buffer shared by any number of producer and
//! consumer threads. Producers block while the ring is full, consumers block
//! while it is empty. Items come out in the exact order their pushes committed.
//!
//! # Key Features
//!
//! - One mutex plus two condition variables ("space available", "item available")
//! - Threads park instead of spinning; the lock is released while waiting
//! - Ring arithmetic isolated in [`RingSlots`]
//! - Additive bounded waits (`try_*`, `*_timeout`) and a [`ShutdownSignal`]
//!   for stoppable worker loops
//!
//! # Example
//!
//! ```
//! use ringbound::BoundedQueue;
//! use std::thread;
//!
//! let queue = BoundedQueue::<u64>::new(3).unwrap();
//!
//! let producer = {
//!     let queue = queue.clone();
//!     thread::spawn(move || {
//!         for i in 0..10 {
//!             queue.push(i);
//!         }
//!     })
//! };
//!
//! let received: Vec<u64> = (0..10).map(|_| queue.pop()).collect();
//! producer.join().unwrap();
//!
//! assert_eq!(received, (0..10).collect::<Vec<_>>());
//! ```

mod config;
mod error;
mod invariants;
mod metrics;
mod queue;
mod shutdown;
mod slots;
mod sync;

pub use config::{QueueConfig, HIGH_THROUGHPUT_CONFIG, RENDEZVOUS_CONFIG};
pub use error::{PopError, PushError, QueueError};
pub use metrics::MetricsSnapshot;
pub use queue::BoundedQueue;
pub use shutdown::ShutdownSignal;
pub use slots::RingSlots;
