#[cfg(debug_assertions)]
use crate::invariants::debug_assert_waiter_registered;
use crate::metrics::{MetricsSnapshot, QueueMetrics};
use crate::sync::{Arc, Condvar, Mutex, MutexGuard};
use crate::{PopError, PushError, QueueConfig, QueueError, RingSlots, ShutdownSignal};
use std::fmt;
use std::sync::PoisonError;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

// =============================================================================
// SYNCHRONIZATION STRATEGY
// =============================================================================
//
// Classic monitor: one mutex guards the ring, the shutdown flag and the
// waiter counts; two condition variables carry the wake-ups.
//
//   not_full  ("space available") - producers park here while the ring is full
//   not_empty ("item available")  - consumers park here while the ring is empty
//
// ## Protocol
//
// **push:** lock → while full: wait(not_full) → write at tail → notify_one(not_empty)
// **pop:**  lock → while empty: wait(not_empty) → read at head → notify_one(not_full)
//
// - `Condvar::wait` releases the mutex while parked and re-acquires it before
//   returning, so the lock is never held across a block.
// - The predicate is re-checked after every wake-up (spurious wake-ups, or a
//   barging thread that took the slot first).
// - Every waiter on one condition waits for the same predicate and each state
//   change frees exactly one slot or item, so `notify_one` is enough. A thread
//   only ever waits on one condition at a time, so no wait cycle can form.
// - Notifications are skipped when nobody is parked on that condition.
// - Push commit order is the order writes land at `tail`; pops read from
//   `head`, so pop order equals push commit order across all producers.
//
// ## Shutdown
//
// `shutdown()` flips the flag under the lock and broadcasts on both
// conditions. Only the fallible operations look at the flag; `push`/`pop`
// keep their unconditional blocking semantics.
//
// =============================================================================

/// Bounded blocking FIFO shared by many producers and consumers.
///
/// `BoundedQueue` is a cheap handle: cloning it yields another handle to the
/// same queue, and the slot storage is released when the last handle drops.
///
/// - [`push`](Self::push) blocks while the queue is full.
/// - [`pop`](Self::pop) blocks while the queue is empty.
///
/// Neither has a timeout; bounded waits are available through
/// [`try_push`](Self::try_push), [`push_timeout`](Self::push_timeout),
/// [`push_interruptible`](Self::push_interruptible) and their pop counterparts.
pub struct BoundedQueue<T> {
    shared: Arc<Shared<T>>,
}

pub(crate) struct Shared<T> {
    state: Mutex<State<T>>,
    /// Signalled when a slot frees up.
    not_full: Condvar,
    /// Signalled when an item arrives.
    not_empty: Condvar,
    capacity: usize,
    metrics: QueueMetrics,
    config: QueueConfig,
}

struct State<T> {
    slots: RingSlots<T>,
    shutdown: bool,
    waiting_producers: usize,
    waiting_consumers: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Producer,
    Consumer,
}

impl<T> State<T> {
    #[inline]
    fn waiters(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Producer => &mut self.waiting_producers,
            Side::Consumer => &mut self.waiting_consumers,
        }
    }
}

impl<T> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, State<T>> {
        // State is only changed through RingSlots calls that complete before
        // any user code runs, so a poisoned lock still guards a valid ring.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn condvar(&self, side: Side) -> &Condvar {
        match side {
            Side::Producer => &self.not_full,
            Side::Consumer => &self.not_empty,
        }
    }

    /// Parks on `side`'s condition until `ready` holds or `deadline` passes.
    ///
    /// Returns the re-acquired guard and whether `ready` held on return.
    fn park<'a, F>(
        &'a self,
        mut guard: MutexGuard<'a, State<T>>,
        side: Side,
        deadline: Option<Instant>,
        ready: F,
    ) -> (MutexGuard<'a, State<T>>, bool)
    where
        F: Fn(&State<T>) -> bool,
    {
        loop {
            if ready(&*guard) {
                return (guard, true);
            }

            let timeout = match deadline {
                None => None,
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return (guard, false);
                    }
                    Some(remaining)
                }
            };

            *guard.waiters(side) += 1;
            if self.config.enable_metrics {
                match side {
                    Side::Producer => self.metrics.add_push_wait(),
                    Side::Consumer => self.metrics.add_pop_wait(),
                }
            }
            trace!(
                ?side,
                len = guard.slots.len(),
                capacity = self.capacity,
                "parking"
            );

            let condvar = self.condvar(side);
            guard = match timeout {
                None => condvar.wait(guard).unwrap_or_else(PoisonError::into_inner),
                Some(timeout) => {
                    condvar
                        .wait_timeout(guard, timeout)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };

            #[cfg(debug_assertions)]
            debug_assert_waiter_registered!("parked", *guard.waiters(side));
            *guard.waiters(side) -= 1;
        }
    }

    /// Writes `item` at the tail and wakes one consumer.
    fn enqueue(&self, state: &mut State<T>, item: T) -> Result<(), T> {
        state.slots.push_back(item)?;

        if self.config.enable_metrics {
            self.metrics.add_pushed();
        }
        if state.waiting_consumers > 0 {
            self.not_empty.notify_one();
        }
        Ok(())
    }

    /// Takes the item at the head and wakes one producer.
    fn dequeue(&self, state: &mut State<T>) -> Option<T> {
        let item = state.slots.pop_front()?;

        if self.config.enable_metrics {
            self.metrics.add_popped();
        }
        if state.waiting_producers > 0 {
            self.not_full.notify_one();
        }
        Some(item)
    }

    fn reject(&self) {
        if self.config.enable_metrics {
            self.metrics.add_rejected();
        }
    }

    fn expire(&self) {
        if self.config.enable_metrics {
            self.metrics.add_timeout();
        }
    }

    /// Marks the queue as shutting down and wakes every parked thread.
    pub(crate) fn shutdown(&self) {
        let mut guard = self.lock();
        if !guard.shutdown {
            guard.shutdown = true;
            debug!(
                capacity = self.capacity,
                len = guard.slots.len(),
                waiting_producers = guard.waiting_producers,
                waiting_consumers = guard.waiting_consumers,
                "queue shut down"
            );
        }
        self.not_full.notify_all();
        self.not_empty.notify_all();
    }

    pub(crate) fn is_shutdown(&self) -> bool {
        self.lock().shutdown
    }
}

impl<T> BoundedQueue<T> {
    /// Creates a queue with `capacity` slots and metrics disabled.
    ///
    /// Any integer type is accepted so that out-of-range requests are
    /// reported rather than wrapped: `new(0)` and `new(-1)` both fail with
    /// [`QueueError::InvalidCapacity`].
    ///
    /// # Example
    ///
    /// ```
    /// use ringbound::{BoundedQueue, QueueError};
    ///
    /// assert!(BoundedQueue::<u32>::new(1).is_ok());
    /// assert!(matches!(
    ///     BoundedQueue::<u32>::new(-1),
    ///     Err(QueueError::InvalidCapacity { .. })
    /// ));
    /// ```
    pub fn new<C>(capacity: C) -> Result<Self, QueueError>
    where
        C: TryInto<usize> + fmt::Display + Copy,
    {
        let requested = capacity
            .try_into()
            .map_err(|_| QueueError::InvalidCapacity {
                requested: capacity.to_string(),
            })?;
        Self::with_config(QueueConfig::new(requested))
    }

    /// Creates a queue from a [`QueueConfig`].
    pub fn with_config(config: QueueConfig) -> Result<Self, QueueError> {
        let slots = RingSlots::new(config.capacity)?;

        debug!(
            capacity = config.capacity,
            metrics = config.enable_metrics,
            "bounded queue created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    slots,
                    shutdown: false,
                    waiting_producers: 0,
                    waiting_consumers: 0,
                }),
                not_full: Condvar::new(),
                not_empty: Condvar::new(),
                capacity: config.capacity,
                metrics: QueueMetrics::new(),
                config,
            }),
        })
    }

    // ---------------------------------------------------------------------
    // BLOCKING API
    // ---------------------------------------------------------------------

    /// Appends `item`, blocking while the queue is full.
    ///
    /// Never drops or overwrites a queued item and never times out.
    pub fn push(&self, item: T) {
        let shared = &*self.shared;
        let mut item = item;
        let mut guard = shared.lock();

        loop {
            let (mut parked, _) =
                shared.park(guard, Side::Producer, None, |s| !s.slots.is_full());
            match shared.enqueue(&mut parked, item) {
                Ok(()) => return,
                // Unreachable while the guard is held; park again if it ever is.
                Err(back) => {
                    item = back;
                    guard = parked;
                }
            }
        }
    }

    /// Removes the oldest item, blocking while the queue is empty.
    pub fn pop(&self) -> T {
        let shared = &*self.shared;
        let mut guard = shared.lock();

        loop {
            let (mut parked, _) =
                shared.park(guard, Side::Consumer, None, |s| !s.slots.is_empty());
            if let Some(item) = shared.dequeue(&mut parked) {
                return item;
            }
            guard = parked;
        }
    }

    // ---------------------------------------------------------------------
    // BOUNDED-WAIT API
    // ---------------------------------------------------------------------

    /// Appends `item` if a slot is free right now.
    ///
    /// Returns the item inside [`PushError::Full`] or [`PushError::ShutDown`]
    /// on failure.
    pub fn try_push(&self, item: T) -> Result<(), PushError<T>> {
        let shared = &*self.shared;
        let mut guard = shared.lock();

        if guard.shutdown {
            shared.reject();
            return Err(PushError::ShutDown(item));
        }

        shared.enqueue(&mut guard, item).map_err(|item| {
            shared.reject();
            PushError::Full(item)
        })
    }

    /// Removes the oldest item if one is queued right now.
    ///
    /// After shutdown, remaining items are still returned; `ShutDown` is
    /// reported only once the queue is empty.
    pub fn try_pop(&self) -> Result<T, PopError> {
        let shared = &*self.shared;
        let mut guard = shared.lock();

        match shared.dequeue(&mut guard) {
            Some(item) => Ok(item),
            None if guard.shutdown => Err(PopError::ShutDown),
            None => Err(PopError::Empty),
        }
    }

    /// Like [`push_interruptible`](Self::push_interruptible), but gives up
    /// with [`PushError::Timeout`] after `timeout`.
    pub fn push_timeout(&self, item: T, timeout: Duration) -> Result<(), PushError<T>> {
        self.push_until(item, Instant::now().checked_add(timeout))
    }

    /// Like [`pop_interruptible`](Self::pop_interruptible), but gives up
    /// with [`PopError::Timeout`] after `timeout`.
    pub fn pop_timeout(&self, timeout: Duration) -> Result<T, PopError> {
        self.pop_until(Instant::now().checked_add(timeout))
    }

    /// Appends `item`, blocking while the queue is full, unless the queue
    /// is (or becomes) shut down.
    pub fn push_interruptible(&self, item: T) -> Result<(), PushError<T>> {
        self.push_until(item, None)
    }

    /// Removes the oldest item, blocking while the queue is empty.
    ///
    /// Once the queue is shut down, queued items keep draining and
    /// [`PopError::ShutDown`] is returned when none are left.
    pub fn pop_interruptible(&self) -> Result<T, PopError> {
        self.pop_until(None)
    }

    fn push_until(&self, item: T, deadline: Option<Instant>) -> Result<(), PushError<T>> {
        let shared = &*self.shared;
        let guard = shared.lock();
        let (mut guard, ready) = shared.park(guard, Side::Producer, deadline, |s| {
            s.shutdown || !s.slots.is_full()
        });

        if guard.shutdown {
            shared.reject();
            return Err(PushError::ShutDown(item));
        }
        if !ready {
            shared.expire();
            return Err(PushError::Timeout(item));
        }

        shared.enqueue(&mut guard, item).map_err(|item| {
            shared.reject();
            PushError::Full(item)
        })
    }

    fn pop_until(&self, deadline: Option<Instant>) -> Result<T, PopError> {
        let shared = &*self.shared;
        let guard = shared.lock();
        let (mut guard, _) = shared.park(guard, Side::Consumer, deadline, |s| {
            s.shutdown || !s.slots.is_empty()
        });

        if let Some(item) = shared.dequeue(&mut guard) {
            return Ok(item);
        }
        if guard.shutdown {
            return Err(PopError::ShutDown);
        }
        shared.expire();
        Err(PopError::Timeout)
    }

    /// Removes every queued item without blocking, oldest first.
    pub fn drain(&self) -> Vec<T> {
        let shared = &*self.shared;
        let mut guard = shared.lock();
        let mut items = Vec::with_capacity(guard.slots.len());

        while let Some(item) = guard.slots.pop_front() {
            if shared.config.enable_metrics {
                shared.metrics.add_popped();
            }
            items.push(item);
        }
        if !items.is_empty() && guard.waiting_producers > 0 {
            shared.not_full.notify_all();
        }
        items
    }

    // ---------------------------------------------------------------------
    // SHUTDOWN
    // ---------------------------------------------------------------------

    /// Shuts the queue down and wakes every parked thread.
    ///
    /// Idempotent. Fallible pushes are rejected from now on; fallible pops
    /// drain what is left and then report `ShutDown`. [`push`](Self::push)
    /// and [`pop`](Self::pop) are unaffected.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    /// Returns `true` once [`shutdown`](Self::shutdown) has been called.
    pub fn is_shutdown(&self) -> bool {
        self.shared.is_shutdown()
    }

    /// Returns a cloneable handle that can shut this queue down.
    pub fn shutdown_signal(&self) -> ShutdownSignal<T> {
        ShutdownSignal::new(Arc::clone(&self.shared))
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Returns the number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns the number of queued items at the time of the call.
    pub fn len(&self) -> usize {
        self.shared.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.lock().slots.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.shared.lock().slots.is_full()
    }

    /// Number of producers currently parked waiting for space.
    pub fn waiting_producers(&self) -> usize {
        self.shared.lock().waiting_producers
    }

    /// Number of consumers currently parked waiting for an item.
    pub fn waiting_consumers(&self) -> usize {
        self.shared.lock().waiting_consumers
    }

    /// Get a metrics snapshot if enabled.
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.shared.config.enable_metrics {
            self.shared.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    pub fn config(&self) -> QueueConfig {
        self.shared.config
    }
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.shared.lock();
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.shared.capacity)
            .field("len", &guard.slots.len())
            .field("shutdown", &guard.shutdown)
            .finish()
    }
}
