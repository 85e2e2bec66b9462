#![cfg(not(feature = "loom"))]

use ringbound::{BoundedQueue, PopError, PushError, QueueConfig, QueueError};
use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Generous bound for liveness checks: a violation fails the test, it never hangs it.
const LIVENESS_TIMEOUT: Duration = Duration::from_secs(10);

/// Polls until `cond` holds or the liveness timeout passes.
fn eventually(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + LIVENESS_TIMEOUT;
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}

#[test]
fn test_construction_validation() {
    assert!(matches!(
        BoundedQueue::<u64>::new(0),
        Err(QueueError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        BoundedQueue::<u64>::new(-1),
        Err(QueueError::InvalidCapacity { .. })
    ));
    assert!(matches!(
        BoundedQueue::<u64>::new(i64::MIN),
        Err(QueueError::InvalidCapacity { .. })
    ));

    // Valid but too large to allocate: reported, not a panic
    let requested = usize::try_from(i64::MAX).unwrap();
    assert_eq!(
        BoundedQueue::<u64>::new(i64::MAX).unwrap_err(),
        QueueError::AllocationFailed { requested }
    );
    assert!(matches!(
        BoundedQueue::<u8>::with_config(QueueConfig::new(usize::MAX)),
        Err(QueueError::AllocationFailed { .. })
    ));

    // new(1) accepts exactly one outstanding item before blocking
    let q = BoundedQueue::<u64>::new(1).unwrap();
    assert!(q.try_push(1).is_ok());
    assert!(matches!(q.try_push(2), Err(PushError::Full(2))));
}

#[test]
fn test_fifo_ordering_single_producer() {
    const N: u64 = 10_000;

    let q = BoundedQueue::<u64>::new(16).unwrap();

    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            for i in 0..N {
                q.push(i);
            }
        })
    };

    // Verify FIFO order
    for expected in 0..N {
        let item = q.pop();
        assert_eq!(item, expected, "FIFO violation: expected {}, got {}", expected, item);
    }

    producer.join().unwrap();
    assert!(q.is_empty());
}

#[test]
fn test_concrete_capacity_three_scenario() {
    let q = BoundedQueue::<u32>::new(3).unwrap();

    // push 1, 2, 3 all succeed without blocking
    for i in 1..=3 {
        assert!(q.try_push(i).is_ok());
    }

    // a 4th push blocks
    let (done_tx, done_rx) = mpsc::channel();
    let fourth = {
        let q = q.clone();
        thread::spawn(move || {
            q.push(4);
            done_tx.send(()).unwrap();
        })
    };
    assert!(eventually(|| q.waiting_producers() == 1));
    assert!(done_rx.try_recv().is_err(), "4th push completed on a full queue");

    // pop returns 1, unblocking the 4th push
    assert_eq!(q.pop(), 1);
    done_rx
        .recv_timeout(LIVENESS_TIMEOUT)
        .expect("4th push was not released by pop");
    fourth.join().unwrap();

    // subsequent pops return 2, 3, 4 in that order
    assert_eq!(q.pop(), 2);
    assert_eq!(q.pop(), 3);
    assert_eq!(q.pop(), 4);
    assert!(q.is_empty());
}

#[test]
fn test_push_timeout_succeeds_when_slot_frees_in_time() {
    let q = BoundedQueue::<u32>::with_config(QueueConfig::new(1).with_metrics(true)).unwrap();
    q.push(1);

    let producer = {
        let q = q.clone();
        thread::spawn(move || q.push_timeout(2, LIVENESS_TIMEOUT))
    };

    // The producer is parked with a deadline; a pop frees the slot before it
    assert!(eventually(|| q.waiting_producers() == 1));
    assert_eq!(q.pop(), 1);

    assert_eq!(producer.join().unwrap(), Ok(()));
    assert_eq!(q.pop(), 2);

    let m = q.metrics();
    assert_eq!(m.timeouts, 0);
    assert!(m.push_waits >= 1);
}

#[test]
fn test_pop_timeout_succeeds_when_item_arrives_in_time() {
    let q = BoundedQueue::<u32>::new(2).unwrap();

    let consumer = {
        let q = q.clone();
        thread::spawn(move || q.pop_timeout(LIVENESS_TIMEOUT))
    };

    assert!(eventually(|| q.waiting_consumers() == 1));
    q.push(9);
    assert_eq!(consumer.join().unwrap(), Ok(9));
}

#[test]
fn test_high_throughput_preset() {
    let q = BoundedQueue::<u64>::with_config(ringbound::HIGH_THROUGHPUT_CONFIG).unwrap();
    assert_eq!(q.capacity(), 65536);

    for i in 0..65536 {
        assert!(q.try_push(i).is_ok());
    }
    assert!(q.is_full());
    assert!(matches!(q.try_push(0), Err(PushError::Full(0))));
    assert_eq!(q.pop(), 0);
    assert_eq!(q.metrics(), ringbound::MetricsSnapshot::default());
}

#[test]
fn test_capacity_one_rendezvous() {
    let q = BoundedQueue::<u32>::with_config(ringbound::RENDEZVOUS_CONFIG).unwrap();
    q.push(1);

    let (done_tx, done_rx) = mpsc::channel();
    let second = {
        let q = q.clone();
        thread::spawn(move || {
            q.push(2);
            done_tx.send(()).unwrap();
        })
    };

    // The second push stays blocked until a pop happens
    assert!(eventually(|| q.waiting_producers() == 1));
    thread::sleep(Duration::from_millis(20));
    assert!(done_rx.try_recv().is_err());
    assert_eq!(q.len(), 1);

    assert_eq!(q.pop(), 1);
    done_rx
        .recv_timeout(LIVENESS_TIMEOUT)
        .expect("second push never completed after pop");
    second.join().unwrap();
    assert_eq!(q.pop(), 2);
}

#[test]
fn test_no_loss_no_duplication_multi_producer_multi_consumer() {
    const N_PRODUCERS: usize = 4;
    const N_CONSUMERS: usize = 3;
    const ITEMS_PER_PRODUCER: u64 = 5_000;
    const TOTAL: usize = N_PRODUCERS * ITEMS_PER_PRODUCER as usize;

    let q = BoundedQueue::<(usize, u64)>::new(8).unwrap();

    let producers: Vec<_> = (0..N_PRODUCERS)
        .map(|producer_id| {
            let q = q.clone();
            thread::spawn(move || {
                for i in 0..ITEMS_PER_PRODUCER {
                    q.push((producer_id, i));
                }
            })
        })
        .collect();

    // Consumers drain until the queue is shut down
    let (item_tx, item_rx) = mpsc::channel();
    let consumers: Vec<_> = (0..N_CONSUMERS)
        .map(|_| {
            let q = q.clone();
            let item_tx = item_tx.clone();
            thread::spawn(move || {
                let mut local = Vec::new();
                while let Ok(item) = q.pop_interruptible() {
                    local.push(item);
                }
                item_tx.send(local).unwrap();
            })
        })
        .collect();
    drop(item_tx);

    for handle in producers {
        handle.join().unwrap();
    }
    assert!(eventually(|| q.is_empty()), "consumers stalled");
    q.shutdown();
    for handle in consumers {
        handle.join().unwrap();
    }

    let mut seen: HashMap<(usize, u64), usize> = HashMap::new();
    let mut total = 0;
    while let Ok(batch) = item_rx.recv_timeout(LIVENESS_TIMEOUT) {
        // Each consumer sees every producer's items in push order
        let mut last: HashMap<usize, u64> = HashMap::new();
        for &(producer_id, value) in &batch {
            if let Some(&prev) = last.get(&producer_id) {
                assert!(value > prev, "producer {} reordered: {} after {}", producer_id, value, prev);
            }
            last.insert(producer_id, value);
            *seen.entry((producer_id, value)).or_default() += 1;
        }
        total += batch.len();
    }

    assert_eq!(total, TOTAL);
    assert_eq!(seen.len(), TOTAL, "items lost");
    assert!(seen.values().all(|&n| n == 1), "items duplicated");
}

#[test]
fn test_pop_order_matches_commit_order() {
    // Producers race for slots. Each producer commits its own pushes in
    // sequence, so a commit-ordered queue must hand them back in sequence.
    const N_PRODUCERS: u64 = 4;
    const PER_PRODUCER: u64 = 1_000;

    let q = BoundedQueue::<u64>::new(4).unwrap();
    let producers: Vec<_> = (0..N_PRODUCERS)
        .map(|p| {
            let q = q.clone();
            thread::spawn(move || {
                for i in 0..PER_PRODUCER {
                    q.push(p * PER_PRODUCER + i);
                }
            })
        })
        .collect();

    let mut per_producer_last = vec![None::<u64>; N_PRODUCERS as usize];
    for _ in 0..N_PRODUCERS * PER_PRODUCER {
        let value = q.pop();
        let p = (value / PER_PRODUCER) as usize;
        if let Some(prev) = per_producer_last[p] {
            assert!(value > prev, "producer {} items out of order", p);
        }
        per_producer_last[p] = Some(value);
    }

    for handle in producers {
        handle.join().unwrap();
    }
    assert!(per_producer_last
        .iter()
        .enumerate()
        .all(|(p, last)| *last == Some((p as u64 + 1) * PER_PRODUCER - 1)));
}

#[test]
fn test_liveness_balanced_load() {
    const ITEMS: u64 = 50_000;

    let q = BoundedQueue::<u64>::new(2).unwrap();
    let (sum_tx, sum_rx) = mpsc::channel();

    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            for i in 1..=ITEMS {
                q.push(i);
            }
        })
    };
    let consumer = {
        let q = q.clone();
        thread::spawn(move || {
            let sum: u64 = (0..ITEMS).map(|_| q.pop()).sum();
            sum_tx.send(sum).unwrap();
        })
    };

    let sum = sum_rx
        .recv_timeout(LIVENESS_TIMEOUT)
        .expect("balanced load did not drain in time");
    assert_eq!(sum, ITEMS * (ITEMS + 1) / 2);

    producer.join().unwrap();
    consumer.join().unwrap();
}

#[test]
fn test_capacity_never_exceeded_under_contention() {
    const CAPACITY: usize = 3;

    let q = BoundedQueue::<u32>::new(CAPACITY).unwrap();
    let signal = q.shutdown_signal();

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let q = q.clone();
            thread::spawn(move || {
                while q.push_interruptible(7).is_ok() {}
            })
        })
        .collect();

    for _ in 0..10_000 {
        assert!(q.len() <= CAPACITY);
        let _ = q.pop_timeout(Duration::from_millis(100));
    }

    signal.shutdown();
    for handle in producers {
        handle.join().unwrap();
    }
    assert!(q.len() <= CAPACITY);
}

#[test]
fn test_shutdown_releases_blocked_producers_and_consumers() {
    let full = BoundedQueue::<u32>::new(1).unwrap();
    full.push(0);
    let empty = BoundedQueue::<u32>::new(1).unwrap();

    let producer = {
        let q = full.clone();
        thread::spawn(move || q.push_interruptible(1))
    };
    let consumer = {
        let q = empty.clone();
        thread::spawn(move || q.pop_interruptible())
    };

    assert!(eventually(|| full.waiting_producers() == 1));
    assert!(eventually(|| empty.waiting_consumers() == 1));

    full.shutdown();
    empty.shutdown_signal().shutdown();

    assert!(matches!(producer.join().unwrap(), Err(PushError::ShutDown(1))));
    assert_eq!(consumer.join().unwrap(), Err(PopError::ShutDown));

    // The item queued before shutdown is still delivered
    assert_eq!(full.pop_interruptible(), Ok(0));
    assert_eq!(full.pop_interruptible(), Err(PopError::ShutDown));
}

#[test]
fn test_metrics_count_operations() {
    let q = BoundedQueue::<u64>::with_config(QueueConfig::new(2).with_metrics(true)).unwrap();

    q.push(1);
    q.push(2);
    assert!(q.try_push(3).is_err());
    assert_eq!(q.pop(), 1);
    assert_eq!(q.try_pop(), Ok(2));
    assert_eq!(q.pop_timeout(Duration::from_millis(5)), Err(PopError::Timeout));

    let m = q.metrics();
    assert_eq!(m.pushed, 2);
    assert_eq!(m.popped, 2);
    assert_eq!(m.rejected, 1);
    assert_eq!(m.timeouts, 1);
}

#[test]
fn test_heap_items_are_moved_not_cloned() {
    let q = BoundedQueue::<String>::new(2).unwrap();

    let producer = {
        let q = q.clone();
        thread::spawn(move || {
            for i in 0..100 {
                q.push(format!("item-{}", i));
            }
        })
    };

    for i in 0..100 {
        assert_eq!(q.pop(), format!("item-{}", i));
    }
    producer.join().unwrap();
}
