//! Accumulator Harness for ringbound
//!
//! Runs a configurable number of producer and consumer threads against one
//! [`BoundedQueue`](ringbound::BoundedQueue). Producers push random values and
//! add them to a shared counter; consumers pop values and subtract them. The
//! counter therefore tracks the sum of what is in flight, and can be sampled
//! while the workers run.
//!
//! The counter is the caller's concern: it lives here, outside the queue's
//! lock, and is updated with atomic read-modify-write operations.
//!
//! # Example
//!
//! ```no_run
//! use ringbound_driver::{Accumulator, DriverConfig};
//!
//! let acc = Accumulator::start(DriverConfig::new(8, 2, 2)).unwrap();
//! std::thread::sleep(std::time::Duration::from_millis(100));
//! println!("in flight: {}", acc.value());
//!
//! let report = acc.stop().unwrap();
//! assert_eq!(report.value, report.residual);
//! ```

mod accumulator;
mod config;
mod error;
mod trace;

pub use accumulator::{Accumulator, RunReport};
pub use config::DriverConfig;
pub use error::DriverError;
pub use trace::init_tracing;
