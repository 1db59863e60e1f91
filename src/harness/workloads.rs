/*!
 * Standard Workloads
 * Contended workloads for every primitive, measured with `run_workers`
 */

use super::{run_workers, HarnessConfig, Measurement, Report};
use crate::collections::{BoundedBlockingQueue, ConcurrentMap, ConcurrentSet};
use crate::locks::{Mutex, ReadWriteLock, ReentrantMutex};
use std::sync::atomic::{AtomicU64, Ordering};

/// Keyspace for map and set workloads; small enough to collide across threads
const KEYSPACE: u64 = 1024;

/// Acquire and release one mutex from every worker
pub fn mutex(threads: usize, iterations: usize) -> Measurement {
    let lock = Mutex::new(0u64);
    run_workers("mutex", threads, iterations, |_| {
        *lock.acquire() += 1;
    })
}

/// Nest `depth` acquisitions of one reentrant mutex, then unwind
pub fn reentrant(threads: usize, iterations: usize, depth: usize) -> Measurement {
    let lock = ReentrantMutex::new(());
    run_workers("reentrant_mutex", threads, iterations, |_| {
        let mut guards = Vec::with_capacity(depth);
        for _ in 0..depth {
            guards.push(lock.acquire());
        }
        while let Some(guard) = guards.pop() {
            drop(guard);
        }
    })
}

/// `readers` threads take read holds while `writers` threads take write holds
pub fn rwlock(readers: usize, writers: usize, iterations: usize) -> Measurement {
    let lock = ReadWriteLock::new(0u64);
    let label = format!("rwlock_r{readers}_w{writers}");
    run_workers(&label, readers + writers, iterations, |slot| {
        if slot < readers {
            let _value = *lock.acquire_read();
        } else {
            *lock.acquire_write() += 1;
        }
    })
}

/// Mixed set/get on a shared map
pub fn map(threads: usize, iterations: usize) -> Measurement {
    let map: ConcurrentMap<u64, u64> = ConcurrentMap::new();
    let next = AtomicU64::new(0);
    run_workers("map", threads, iterations, |_| {
        let n = next.fetch_add(1, Ordering::Relaxed);
        let key = n % KEYSPACE;
        if n % 4 == 0 {
            let _ = map.set(key, n);
        } else {
            let _ = map.get_or(&key, 0);
        }
    })
}

/// Mixed add/contains/discard on a shared set
pub fn set(threads: usize, iterations: usize) -> Measurement {
    let set: ConcurrentSet<u64> = ConcurrentSet::new();
    let next = AtomicU64::new(0);
    run_workers("set", threads, iterations, |_| {
        let n = next.fetch_add(1, Ordering::Relaxed);
        let key = n % KEYSPACE;
        let _ = match n % 3 {
            0 => set.add(key),
            1 => set.contains(&key),
            _ => set.discard(&key),
        };
    })
}

/// `pairs` producers and `pairs` consumers moving items through one queue
///
/// Even slots produce and odd slots consume, so every put has a matching get.
pub fn queue(pairs: usize, iterations: usize, capacity: usize) -> Measurement {
    let queue = BoundedBlockingQueue::new(capacity);
    let label = format!("queue_cap{capacity}");
    run_workers(&label, pairs * 2, iterations, |slot| {
        if slot % 2 == 0 {
            queue.put(slot);
        } else {
            let _ = queue.get();
        }
    })
}

/// Every workload, grouped into one report per area
pub fn run_all(config: &HarnessConfig) -> Vec<Report> {
    let threads = config.threads.max(1);
    let iterations = config.iterations;

    let mut locks = Report::new("locks", config.clone());
    locks.push(&mutex(threads, iterations));
    locks.push(&reentrant(threads, iterations, config.reentrant_depth));
    locks.push(&rwlock(threads, 1, iterations));
    locks.push(&rwlock(threads.div_ceil(2), threads.div_ceil(2), iterations));

    let mut collections = Report::new("collections", config.clone());
    collections.push(&map(threads, iterations));
    collections.push(&set(threads, iterations));

    let mut queues = Report::new("queues", config.clone());
    queues.push(&queue(threads.div_ceil(2), iterations, config.queue_capacity));

    vec![locks, collections, queues]
}
