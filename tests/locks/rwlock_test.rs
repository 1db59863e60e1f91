/*!
 * Read-Write Lock Tests
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use syncx::{Guard, LockMode, ReadWriteLock};

#[test]
fn test_concurrent_readers_coexist() {
    let lock = Arc::new(ReadWriteLock::new(()));
    let barrier = Arc::new(Barrier::new(4));
    let peak = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lock = lock.clone();
            let barrier = barrier.clone();
            let peak = peak.clone();
            thread::spawn(move || {
                let _guard = lock.acquire_read();
                // Every reader is inside before any leaves
                barrier.wait();
                peak.fetch_max(lock.reader_count(), Ordering::SeqCst);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(peak.load(Ordering::SeqCst), 4);
}

#[test]
fn test_writer_blocks_try_read() {
    let lock = Arc::new(ReadWriteLock::new(()));
    let lock_clone = lock.clone();

    let writer = thread::spawn(move || {
        let guard = lock_clone.acquire_write();
        assert_eq!(guard.mode(), LockMode::Write);
        thread::sleep(Duration::from_millis(100));
    });

    thread::sleep(Duration::from_millis(20));
    let reader = lock.clone();
    let got_read = thread::spawn(move || reader.try_acquire_read().is_some())
        .join()
        .unwrap();
    assert!(!got_read);

    writer.join().unwrap();
}

#[test]
fn test_writer_excludes_writers() {
    let lock = Arc::new(ReadWriteLock::new(0u64));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let lock = lock.clone();
            thread::spawn(move || {
                for _ in 0..1_000 {
                    lock.write(|n| *n += 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(lock.read(|n| *n), 4_000);
}

#[test]
fn test_read_timeout_while_writer_holds() {
    let lock = ReadWriteLock::new(());
    let _writer = lock.acquire_write();

    assert!(lock.acquire_read_timeout(Duration::from_millis(30)).is_none());
    assert!(lock.is_write_locked());
    assert_eq!(lock.reader_count(), 0);
}

#[test]
fn test_mixed_readers_and_writers_stay_consistent() {
    // Writers keep the two halves equal; readers must never see them differ
    let lock = Arc::new(ReadWriteLock::new((0u64, 0u64)));
    let torn = Arc::new(AtomicUsize::new(0));
    let mut handles = Vec::new();

    for _ in 0..2 {
        let lock = lock.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let mut pair = lock.acquire_write();
                pair.0 += 1;
                thread::yield_now();
                pair.1 += 1;
            }
        }));
    }

    for _ in 0..4 {
        let lock = lock.clone();
        let torn = torn.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..500 {
                let pair = lock.acquire_read();
                if pair.0 != pair.1 {
                    torn.fetch_add(1, Ordering::Relaxed);
                }
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(torn.load(Ordering::Relaxed), 0);
    assert_eq!(*lock.acquire_read(), (1_000, 1_000));
}
