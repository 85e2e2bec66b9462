//! Configuration for the accumulator harness.

use std::ops::RangeInclusive;
use std::time::Duration;

/// Configuration for an [`Accumulator`](crate::Accumulator) run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Queue capacity as requested; validated by the queue.
    pub capacity: i64,

    /// Number of producer threads.
    pub producers: usize,

    /// Number of consumer threads.
    pub consumers: usize,

    /// How often the CLI prints the accumulated value.
    ///
    /// Default: 1s
    pub report_interval: Duration,

    /// Values producers draw from, uniformly.
    ///
    /// Default: `1..=10`
    pub values: RangeInclusive<i64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            capacity: 16,
            producers: 1,
            consumers: 1,
            report_interval: Duration::from_secs(1),
            values: 1..=10,
        }
    }
}

impl DriverConfig {
    /// Creates a configuration with the given sizes and default reporting.
    pub fn new(capacity: i64, producers: usize, consumers: usize) -> Self {
        Self {
            capacity,
            producers,
            consumers,
            ..Self::default()
        }
    }

    /// Sets the report interval.
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Sets the range producers draw values from.
    pub fn with_values(mut self, values: RangeInclusive<i64>) -> Self {
        self.values = values;
        self
    }
}
