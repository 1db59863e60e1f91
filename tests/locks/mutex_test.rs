/*!
 * Mutex Tests
 */

use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use syncx::{Guard, LockMode, Mutex, StrategyType, SyncConfig, UsageError};

#[test]
fn test_is_locked_follows_guard() {
    let mutex = Mutex::new(());

    let mut guard = mutex.acquire();
    assert!(mutex.is_locked());
    assert_eq!(guard.mode(), LockMode::Exclusive);

    guard.release().unwrap();
    assert!(!mutex.is_locked());
}

#[test]
fn test_try_acquire_from_other_thread() {
    let mutex = Arc::new(Mutex::new(()));
    let guard = mutex.acquire();

    let mutex_clone = mutex.clone();
    let while_locked = thread::spawn(move || mutex_clone.try_acquire().is_some())
        .join()
        .unwrap();
    assert!(!while_locked);

    drop(guard);

    let mutex_clone = mutex.clone();
    let after_release = thread::spawn(move || mutex_clone.try_acquire().is_some())
        .join()
        .unwrap();
    assert!(after_release);
}

#[test]
fn test_double_release_is_usage_error() {
    let mutex = Mutex::new(());
    let mut guard = mutex.acquire();

    assert_eq!(guard.release(), Ok(()));
    assert_eq!(guard.release(), Err(UsageError::AlreadyReleased));
    assert!(!guard.is_active());
}

#[test]
fn test_acquire_timeout_gives_up_and_leaves_lock() {
    let mutex = Arc::new(Mutex::new(1));
    let _held = mutex.acquire();

    let mutex_clone = mutex.clone();
    let (acquired, elapsed) = thread::spawn(move || {
        let start = Instant::now();
        let acquired = mutex_clone.acquire_timeout(Duration::from_millis(60)).is_some();
        (acquired, start.elapsed())
    })
    .join()
    .unwrap();

    assert!(!acquired);
    assert!(elapsed >= Duration::from_millis(60));
    assert!(mutex.is_locked());
}

#[test]
fn test_blocked_acquirer_wakes_on_release() {
    for strategy in [StrategyType::Park, StrategyType::SpinThenPark] {
        let config = SyncConfig {
            strategy,
            ..Default::default()
        };
        let mutex = Arc::new(Mutex::with_config(0u32, &config));
        let entered = Arc::new(AtomicBool::new(false));
        let guard = mutex.acquire();

        let mutex_clone = mutex.clone();
        let entered_clone = entered.clone();
        let waiter = thread::spawn(move || {
            let mut value = mutex_clone.acquire();
            entered_clone.store(true, Ordering::SeqCst);
            *value += 1;
        });

        // Give waiter time to park
        thread::sleep(Duration::from_millis(50));
        assert!(!entered.load(Ordering::SeqCst));

        drop(guard);
        waiter.join().unwrap();
        assert!(entered.load(Ordering::SeqCst));
        assert_eq!(*mutex.acquire(), 1);
    }
}

#[test]
fn test_mutual_exclusion_counter() {
    let mutex = Arc::new(Mutex::new(0u64));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let mutex = mutex.clone();
            thread::spawn(move || {
                for _ in 0..2_000 {
                    mutex.with(|n| *n += 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(*mutex.acquire(), 16_000);
}
