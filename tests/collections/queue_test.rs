/*!
 * Blocking Queue Tests
 */

use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use syncx::{BoundedBlockingQueue, Mutex, QueueError, SyncError};

#[test]
fn test_capacity_one_scenario() {
    let queue = BoundedBlockingQueue::new(1);
    queue.put("alpha");

    let rejected = queue.put_nowait("beta").unwrap_err();
    assert_eq!(rejected.into_inner(), "beta");

    assert_eq!(queue.get(), "alpha");
    assert_eq!(queue.get_nowait(), Err(QueueError::Empty));
}

#[test]
fn test_blocking_handoff() {
    let queue = Arc::new(BoundedBlockingQueue::new(1));
    queue.put("held");

    let queue_clone = queue.clone();
    let producer = thread::spawn(move || queue_clone.put("payload"));

    // Give producer time to block
    thread::sleep(Duration::from_millis(50));
    assert!(!producer.is_finished());
    assert_eq!(queue.waiting_producers(), 1);

    assert_eq!(queue.get(), "held");
    producer.join().unwrap();
    assert_eq!(queue.get_timeout(Duration::from_secs(1)), Ok("payload"));
}

#[test]
fn test_blocked_consumer_wakes_on_put() {
    let queue = Arc::new(BoundedBlockingQueue::new(2));

    let queue_clone = queue.clone();
    let consumer = thread::spawn(move || queue_clone.get());

    thread::sleep(Duration::from_millis(50));
    queue.put(42);
    assert_eq!(consumer.join().unwrap(), 42);
}

#[test]
fn test_timeouts_leave_queue_unchanged() {
    let queue = BoundedBlockingQueue::new(1);

    let start = Instant::now();
    assert_eq!(queue.get_timeout(Duration::from_millis(40)), Err(QueueError::Empty));
    assert!(start.elapsed() >= Duration::from_millis(40));

    queue.put(1);
    let start = Instant::now();
    let rejected = queue.put_timeout(2, Duration::from_millis(40)).unwrap_err();
    assert!(start.elapsed() >= Duration::from_millis(40));
    assert_eq!(rejected.0, 2);
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.get(), 1);
}

#[test]
fn test_full_error_into_sync_error() {
    let queue = BoundedBlockingQueue::new(1);
    queue.put(());

    let err: SyncError = queue.put_nowait(()).unwrap_err().into();
    assert!(matches!(err, SyncError::Queue(QueueError::Full)));
}

#[test]
fn test_per_producer_fifo_with_many_producers() {
    let queue = Arc::new(BoundedBlockingQueue::new(8));
    let producers: Vec<_> = (0..4usize)
        .map(|p| {
            let queue = queue.clone();
            thread::spawn(move || {
                for seq in 0..250usize {
                    queue.put((p, seq));
                }
            })
        })
        .collect();

    let mut last_seen: HashMap<usize, usize> = HashMap::new();
    for _ in 0..1_000 {
        let (p, seq) = queue.get();
        if let Some(&prev) = last_seen.get(&p) {
            assert!(seq > prev, "producer {p} reordered: {prev} then {seq}");
        }
        last_seen.insert(p, seq);
    }

    for handle in producers {
        handle.join().unwrap();
    }
    assert!(queue.is_empty());
    assert_eq!(last_seen.len(), 4);
}

#[test]
fn test_aggregate_fifo_across_producers() {
    let queue = Arc::new(BoundedBlockingQueue::new(4));
    // Sequence numbers are taken and enqueued under one lock, so the
    // enqueue order across all producers is exactly the sequence order
    let sequence = Arc::new(Mutex::new(0u64));

    let producers: Vec<_> = (0..4)
        .map(|_| {
            let queue = queue.clone();
            let sequence = sequence.clone();
            thread::spawn(move || {
                for _ in 0..250 {
                    let mut next = sequence.acquire();
                    queue.put(*next);
                    *next += 1;
                }
            })
        })
        .collect();

    let mut expected = 0u64;
    for _ in 0..1_000 {
        assert_eq!(queue.get(), expected, "dequeue order diverged from enqueue order");
        expected += 1;
    }

    for handle in producers {
        handle.join().unwrap();
    }
    assert!(queue.is_empty());
}
