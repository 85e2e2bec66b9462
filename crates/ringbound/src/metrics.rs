use crate::sync::{AtomicU64, Ordering};
use crossbeam_utils::CachePadded;

/// Point-in-time copy of a queue's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Items accepted by any push variant.
    pub pushed: u64,
    /// Items returned by any pop variant.
    pub popped: u64,
    /// Times a producer parked waiting for space.
    pub push_waits: u64,
    /// Times a consumer parked waiting for an item.
    pub pop_waits: u64,
    /// Timed operations that expired.
    pub timeouts: u64,
    /// Pushes refused because the queue was full or shut down.
    pub rejected: u64,
}

#[derive(Debug)]
struct ProducerCounters {
    pushed: AtomicU64,
    waits: AtomicU64,
}

#[derive(Debug)]
struct ConsumerCounters {
    popped: AtomicU64,
    waits: AtomicU64,
}

/// Thread-safe counters. Producer and consumer sides sit on separate cache
/// lines so the two halves of the queue do not false-share.
#[derive(Debug)]
pub(crate) struct QueueMetrics {
    producer: CachePadded<ProducerCounters>,
    consumer: CachePadded<ConsumerCounters>,
    timeouts: AtomicU64,
    rejected: AtomicU64,
}

impl QueueMetrics {
    pub(crate) fn new() -> Self {
        Self {
            producer: CachePadded::new(ProducerCounters {
                pushed: AtomicU64::new(0),
                waits: AtomicU64::new(0),
            }),
            consumer: CachePadded::new(ConsumerCounters {
                popped: AtomicU64::new(0),
                waits: AtomicU64::new(0),
            }),
            timeouts: AtomicU64::new(0),
            rejected: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn add_pushed(&self) {
        self.producer.pushed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_push_wait(&self) {
        self.producer.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_popped(&self) {
        self.consumer.popped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_pop_wait(&self) {
        self.consumer.waits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushed: self.producer.pushed.load(Ordering::Relaxed),
            popped: self.consumer.popped.load(Ordering::Relaxed),
            push_waits: self.producer.waits.load(Ordering::Relaxed),
            pop_waits: self.consumer.waits.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
