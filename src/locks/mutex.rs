/*!
 * Mutex
 *
 * Exclusive lock over optional data. `Mutex` (i.e. `Mutex<()>`) is the bare
 * lock; `Mutex<T>` protects a `T` and its guard dereferences to it.
 *
 * No owner is tracked: a guard may be handed to another thread and released
 * there.
 */

use super::raw::RawMutex;
use crate::core::errors::UsageError;
use crate::core::guard::{Guard, GuardMetadata, GuardResult, LockMode};
use crate::core::sync::SyncConfig;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

const RESOURCE: &str = "mutex";

/// Exclusive, non-reentrant lock
///
/// # Example
///
/// ```ignore
/// let counter = Mutex::new(0u64);
/// *counter.acquire() += 1;
///
/// if let Some(mut guard) = counter.acquire_timeout(Duration::from_millis(10)) {
///     *guard += 1;
/// }
/// ```
pub struct Mutex<T: ?Sized = ()> {
    raw: RawMutex,
    data: UnsafeCell<T>,
}

// SAFETY: the raw lock serializes every access to `data`
unsafe impl<T: ?Sized + Send> Send for Mutex<T> {}
unsafe impl<T: ?Sized + Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    /// Create an unlocked mutex
    pub fn new(data: T) -> Self {
        Self {
            raw: RawMutex::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Create an unlocked mutex with an explicit wait strategy
    pub fn with_config(data: T, config: &SyncConfig) -> Self {
        Self {
            raw: RawMutex::with_config(config),
            data: UnsafeCell::new(data),
        }
    }

    /// Consume the mutex, returning the data
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> Mutex<T> {
    /// Acquire, blocking until the lock is free
    pub fn acquire(&self) -> MutexGuard<'_, T> {
        self.raw.lock();
        MutexGuard::new(self)
    }

    /// Acquire without blocking
    pub fn try_acquire(&self) -> Option<MutexGuard<'_, T>> {
        self.raw.try_lock().then(|| MutexGuard::new(self))
    }

    /// Acquire, waiting at most `timeout`
    ///
    /// `None` means not acquired; nothing else changed.
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<MutexGuard<'_, T>> {
        self.raw.try_lock_for(timeout).then(|| MutexGuard::new(self))
    }

    /// Acquire, waiting until `deadline` at the latest
    pub fn acquire_until(&self, deadline: Instant) -> Option<MutexGuard<'_, T>> {
        self.raw.try_lock_until(deadline).then(|| MutexGuard::new(self))
    }

    /// Run `f` with the lock held; released on every exit path
    pub fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire();
        f(&mut guard)
    }

    /// Advisory, point-in-time lock state
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Mutable access without locking (exclusive borrow proves no guard exists)
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for Mutex<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: ?Sized + std::fmt::Debug> std::fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut d = f.debug_struct("Mutex");
        match self.try_acquire() {
            Some(guard) => d.field("data", &&*guard),
            None => d.field("data", &format_args!("<locked>")),
        };
        d.finish_non_exhaustive()
    }
}

/// Held `Mutex`; releases on drop
pub struct MutexGuard<'a, T: ?Sized> {
    lock: &'a Mutex<T>,
    held: bool,
    metadata: GuardMetadata,
}

// SAFETY: no owner identity is attached to the lock, so the holder may move
unsafe impl<T: ?Sized + Send> Send for MutexGuard<'_, T> {}
unsafe impl<T: ?Sized + Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T: ?Sized> MutexGuard<'a, T> {
    #[inline]
    fn new(lock: &'a Mutex<T>) -> Self {
        Self {
            lock,
            held: true,
            metadata: GuardMetadata::new(RESOURCE, LockMode::Exclusive),
        }
    }

    /// The mutex this guard holds
    #[inline]
    pub fn mutex(&self) -> &'a Mutex<T> {
        self.lock
    }

    fn unlock(&mut self) -> GuardResult<()> {
        if !self.held {
            return Err(UsageError::AlreadyReleased);
        }
        self.held = false;
        self.lock.raw.unlock()?;
        tracing::trace!(
            resource = RESOURCE,
            held_us = self.metadata.lifetime_micros(),
            "lock released"
        );
        Ok(())
    }
}

impl<T: ?Sized> Guard for MutexGuard<'_, T> {
    fn metadata(&self) -> &GuardMetadata {
        &self.metadata
    }

    fn is_active(&self) -> bool {
        self.held
    }

    fn release(&mut self) -> GuardResult<()> {
        self.unlock()
    }
}

impl<T: ?Sized> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        assert!(self.held, "mutex guard used after release");
        // SAFETY: the raw lock is held by this guard
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        assert!(self.held, "mutex guard used after release");
        // SAFETY: the raw lock is held by this guard, which is borrowed mutably
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        if self.held {
            let _ = self.unlock();
        }
    }
}

impl<T: ?Sized + std::fmt::Debug> std::fmt::Debug for MutexGuard<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.held {
            std::fmt::Debug::fmt(&**self, f)
        } else {
            f.write_str("MutexGuard(<released>)")
        }
    }
}
