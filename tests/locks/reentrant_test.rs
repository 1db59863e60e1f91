/*!
 * Reentrant Mutex Tests
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use syncx::{Guard, ReentrantMutex, UsageError};

#[test]
fn test_nested_acquire_then_balanced_release() {
    let lock = Arc::new(ReentrantMutex::new(()));

    let mut outer = lock.acquire();
    let mut inner = lock.acquire();
    assert_eq!(lock.depth(), 2);

    inner.release().unwrap();
    let lock_clone = lock.clone();
    assert!(thread::spawn(move || lock_clone.try_acquire().is_none())
        .join()
        .unwrap());

    outer.release().unwrap();
    let lock_clone = lock.clone();
    assert!(thread::spawn(move || lock_clone.try_acquire().is_some())
        .join()
        .unwrap());
}

#[test]
fn test_owner_only_visible_to_owner() {
    let lock = Arc::new(ReentrantMutex::new(()));
    let _guard = lock.acquire();
    assert!(lock.is_owned_by_current_thread());

    let lock_clone = lock.clone();
    let (owned, depth) = thread::spawn(move || {
        (lock_clone.is_owned_by_current_thread(), lock_clone.depth())
    })
    .join()
    .unwrap();

    assert!(!owned);
    assert_eq!(depth, 0);
}

#[test]
fn test_waiter_proceeds_after_full_release() {
    let lock = Arc::new(ReentrantMutex::new(7));
    let outer = lock.acquire();
    let inner = lock.acquire();

    let lock_clone = lock.clone();
    let waiter = thread::spawn(move || *lock_clone.acquire());

    thread::sleep(Duration::from_millis(30));
    drop(inner);
    thread::sleep(Duration::from_millis(30));
    assert!(!waiter.is_finished());

    drop(outer);
    assert_eq!(waiter.join().unwrap(), 7);
}

#[test]
fn test_recursive_helper_calls() {
    fn countdown(lock: &ReentrantMutex<()>, n: usize) -> usize {
        let _guard = lock.acquire();
        if n == 0 {
            lock.depth()
        } else {
            countdown(lock, n - 1)
        }
    }

    let lock = ReentrantMutex::new(());
    assert_eq!(countdown(&lock, 9), 10);
    assert!(!lock.is_locked());
}

#[test]
fn test_double_release_is_usage_error() {
    let lock = ReentrantMutex::new(());
    let mut guard = lock.acquire();
    guard.release().unwrap();
    assert_eq!(guard.release(), Err(UsageError::AlreadyReleased));
}
