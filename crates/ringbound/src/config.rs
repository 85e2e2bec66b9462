/// Configuration for a [`BoundedQueue`](crate::BoundedQueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueConfig {
    /// Number of slots in the ring (must be at least 1, checked by the queue)
    pub capacity: usize,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
}

impl QueueConfig {
    /// Creates a configuration with the given capacity and metrics disabled.
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            enable_metrics: false,
        }
    }

    /// Enables or disables metrics collection.
    pub const fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            enable_metrics: false,
        }
    }
}

/// Single-slot hand-off: every push waits for the previous item to be popped.
pub const RENDEZVOUS_CONFIG: QueueConfig = QueueConfig::new(1);

/// High throughput configuration (64K slots)
pub const HIGH_THROUGHPUT_CONFIG: QueueConfig = QueueConfig::new(1 << 16);
