//! Producer/consumer workers around a shared running total.
//!
//! Producers draw a value, push it, and only then add it to the total.
//! Consumers pop a value and subtract it. Both loops run until the queue is
//! shut down; consumers keep popping until the queue is empty, so a run with
//! at least one consumer always ends with nothing left in flight.

use std::io::{self, Write};
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use ringbound::{BoundedQueue, PushError};
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::error::DriverError;

/// Counters shared by every worker of one run.
#[derive(Debug, Default)]
struct Totals {
    value: AtomicI64,
    pushed: AtomicU64,
    popped: AtomicU64,
}

#[derive(Debug)]
struct Worker {
    name: String,
    handle: JoinHandle<()>,
}

/// Final figures of a stopped run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    /// Running total once every worker has exited.
    pub value: i64,
    /// Items successfully pushed.
    pub pushed: u64,
    /// Items successfully popped.
    pub popped: u64,
    /// Sum of the items still queued at the end of the run.
    pub residual: i64,
    /// Number of items still queued at the end of the run.
    pub leftover: usize,
}

impl RunReport {
    /// True when the running total agrees with what is left in the queue.
    pub fn is_balanced(&self) -> bool {
        self.value == self.residual
            && self.pushed.checked_sub(self.popped) == Some(self.leftover as u64)
    }
}

/// A running set of producer and consumer threads.
///
/// Dropping an `Accumulator` without calling [`stop`](Self::stop) still
/// shuts the queue down and joins the workers.
#[derive(Debug)]
pub struct Accumulator {
    queue: BoundedQueue<i64>,
    totals: Arc<Totals>,
    workers: Vec<Worker>,
    config: DriverConfig,
}

impl Accumulator {
    /// Builds the queue and spawns `producers + consumers` named threads.
    pub fn start(config: DriverConfig) -> Result<Self, DriverError> {
        if config.values.is_empty() {
            return Err(DriverError::EmptyValueRange {
                start: *config.values.start(),
                end: *config.values.end(),
            });
        }

        if config.producers.checked_add(config.consumers).is_none() {
            return Err(DriverError::TooManyWorkers {
                producers: config.producers,
                consumers: config.consumers,
            });
        }

        let queue = BoundedQueue::new(config.capacity)?;
        let mut acc = Self {
            queue,
            totals: Arc::new(Totals::default()),
            workers: Vec::new(),
            config,
        };

        if let Err(err) = acc.spawn_workers() {
            acc.halt();
            return Err(err);
        }

        info!(
            capacity = acc.queue.capacity(),
            producers = acc.config.producers,
            consumers = acc.config.consumers,
            "accumulator started"
        );
        Ok(acc)
    }

    fn spawn_workers(&mut self) -> Result<(), DriverError> {
        for i in 0..self.config.producers {
            let queue = self.queue.clone();
            let totals = Arc::clone(&self.totals);
            let values = self.config.values.clone();
            self.spawn(format!("producer-{i}"), move || {
                produce(&queue, values, &totals);
            })?;
        }
        for i in 0..self.config.consumers {
            let queue = self.queue.clone();
            let totals = Arc::clone(&self.totals);
            self.spawn(format!("consumer-{i}"), move || consume(&queue, &totals))?;
        }
        Ok(())
    }

    fn spawn<F>(&mut self, name: String, body: F) -> Result<(), DriverError>
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::Builder::new().name(name.clone()).spawn(body)?;
        self.workers.push(Worker { name, handle });
        Ok(())
    }

    /// Current running total. May be mid-update when sampled.
    pub fn value(&self) -> i64 {
        self.totals.value.load(Ordering::Relaxed)
    }

    /// Items pushed so far.
    pub fn pushed(&self) -> u64 {
        self.totals.pushed.load(Ordering::Relaxed)
    }

    /// Items popped so far.
    pub fn popped(&self) -> u64 {
        self.totals.popped.load(Ordering::Relaxed)
    }

    /// The queue the workers share.
    pub fn queue(&self) -> &BoundedQueue<i64> {
        &self.queue
    }

    /// The configuration this run was started with.
    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// Writes the running total to `out` once per `interval`, starting
    /// immediately, until `deadline` passes. Without a deadline it only
    /// returns on a write error.
    pub fn report_until<W: Write>(
        &self,
        out: &mut W,
        interval: Duration,
        deadline: Option<Instant>,
    ) -> io::Result<()> {
        loop {
            writeln!(out, "{}", self.value())?;

            if deadline.is_some_and(|at| Instant::now() >= at) {
                return Ok(());
            }
            thread::sleep(interval);
        }
    }

    /// Shuts the queue down, joins every worker and reports the final state.
    ///
    /// Returns [`DriverError::WorkerPanicked`] for the first worker that
    /// panicked; the others are still joined.
    pub fn stop(mut self) -> Result<RunReport, DriverError> {
        let failed = self.halt();

        let remaining = self.queue.drain();
        let report = RunReport {
            value: self.value(),
            pushed: self.pushed(),
            popped: self.popped(),
            residual: remaining.iter().sum(),
            leftover: remaining.len(),
        };

        if let Some(name) = failed {
            return Err(DriverError::WorkerPanicked { name });
        }

        info!(
            value = report.value,
            pushed = report.pushed,
            popped = report.popped,
            leftover = report.leftover,
            "accumulator stopped"
        );
        Ok(report)
    }

    /// Shuts the queue down and joins all workers. Returns the name of the
    /// first worker that panicked, if any.
    fn halt(&mut self) -> Option<String> {
        self.queue.shutdown();

        let mut failed = None;
        for worker in self.workers.drain(..) {
            if worker.handle.join().is_err() {
                warn!(worker = %worker.name, "worker panicked");
                failed.get_or_insert(worker.name);
            }
        }
        failed
    }
}

impl Drop for Accumulator {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.halt();
        }
    }
}

fn produce(queue: &BoundedQueue<i64>, values: RangeInclusive<i64>, totals: &Totals) {
    debug!("producer started");
    let mut rng = rand::thread_rng();

    loop {
        let value = rng.gen_range(values.clone());
        match queue.push_interruptible(value) {
            Ok(()) => {
                totals.value.fetch_add(value, Ordering::Relaxed);
                totals.pushed.fetch_add(1, Ordering::Relaxed);
            }
            Err(PushError::ShutDown(_)) => break,
            // push_interruptible waits without a deadline
            Err(PushError::Full(_) | PushError::Timeout(_)) => continue,
        }
    }

    debug!("producer exiting");
}

fn consume(queue: &BoundedQueue<i64>, totals: &Totals) {
    debug!("consumer started");

    while let Ok(value) = queue.pop_interruptible() {
        totals.value.fetch_sub(value, Ordering::Relaxed);
        totals.popped.fetch_add(1, Ordering::Relaxed);
    }

    debug!("consumer exiting");
}
