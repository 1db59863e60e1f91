/*!
 * Reentrant Mutex
 *
 * Owner-aware recursive lock built on `RawMutex`. The owning thread may
 * acquire again without blocking; every acquisition must be released, and
 * the lock only becomes free for other threads once the depth returns to 0.
 */

use super::raw::RawMutex;
use crate::core::errors::UsageError;
use crate::core::guard::{Guard, GuardMetadata, GuardResult, LockMode};
use crate::core::sync::{SyncConfig, ThreadToken};
use std::cell::UnsafeCell;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

const RESOURCE: &str = "reentrant_mutex";
const NO_OWNER: u64 = 0;

/// Recursive lock; guards give shared access only
///
/// Invariant: `depth > 0` exactly when `owner` is set. Only the owner
/// thread writes `depth`.
pub struct ReentrantMutex<T: ?Sized = ()> {
    raw: RawMutex,
    owner: AtomicU64,
    depth: AtomicUsize,
    data: UnsafeCell<T>,
}

// SAFETY: at most one thread (the owner) can reach `data` at a time
unsafe impl<T: ?Sized + Send> Send for ReentrantMutex<T> {}
unsafe impl<T: ?Sized + Send> Sync for ReentrantMutex<T> {}

impl<T> ReentrantMutex<T> {
    /// Create an unlocked reentrant mutex
    pub fn new(data: T) -> Self {
        Self::from_raw(RawMutex::new(), data)
    }

    /// Create with an explicit wait strategy for the first acquisition
    pub fn with_config(data: T, config: &SyncConfig) -> Self {
        Self::from_raw(RawMutex::with_config(config), data)
    }

    fn from_raw(raw: RawMutex, data: T) -> Self {
        Self {
            raw,
            owner: AtomicU64::new(NO_OWNER),
            depth: AtomicUsize::new(0),
            data: UnsafeCell::new(data),
        }
    }

    /// Consume the mutex, returning the data
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> ReentrantMutex<T> {
    /// Acquire; immediate if the calling thread already owns the lock
    pub fn acquire(&self) -> ReentrantMutexGuard<'_, T> {
        let me = ThreadToken::current();
        if !self.reenter(me) {
            self.raw.lock();
            self.take_ownership(me);
        }
        ReentrantMutexGuard::new(self)
    }

    /// Acquire without blocking
    pub fn try_acquire(&self) -> Option<ReentrantMutexGuard<'_, T>> {
        let me = ThreadToken::current();
        if self.reenter(me) {
            return Some(ReentrantMutexGuard::new(self));
        }
        if !self.raw.try_lock() {
            return None;
        }
        self.take_ownership(me);
        Some(ReentrantMutexGuard::new(self))
    }

    /// Acquire, waiting at most `timeout` for another owner to finish
    pub fn acquire_timeout(&self, timeout: Duration) -> Option<ReentrantMutexGuard<'_, T>> {
        let me = ThreadToken::current();
        if self.reenter(me) {
            return Some(ReentrantMutexGuard::new(self));
        }
        if !self.raw.try_lock_for(timeout) {
            return None;
        }
        self.take_ownership(me);
        Some(ReentrantMutexGuard::new(self))
    }

    /// Acquire, waiting until `deadline` at the latest
    pub fn acquire_until(&self, deadline: Instant) -> Option<ReentrantMutexGuard<'_, T>> {
        let me = ThreadToken::current();
        if self.reenter(me) {
            return Some(ReentrantMutexGuard::new(self));
        }
        if !self.raw.try_lock_until(deadline) {
            return None;
        }
        self.take_ownership(me);
        Some(ReentrantMutexGuard::new(self))
    }

    /// Run `f` with the lock held; released on every exit path
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.acquire();
        f(&guard)
    }

    /// Advisory, point-in-time lock state
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    /// Whether the calling thread currently owns the lock
    #[inline]
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == ThreadToken::current().as_u64()
    }

    /// Recursion depth as seen by the calling thread (0 if not the owner)
    pub fn depth(&self) -> usize {
        if self.is_owned_by_current_thread() {
            self.depth.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    /// Mutable access without locking (exclusive borrow proves no guard exists)
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    /// Bump the depth if `me` already owns the lock
    ///
    /// Only the owner can observe its own token in `owner`, so the relaxed
    /// load cannot produce a false positive.
    #[inline]
    fn reenter(&self, me: ThreadToken) -> bool {
        if self.owner.load(Ordering::Relaxed) != me.as_u64() {
            return false;
        }
        self.depth.fetch_add(1, Ordering::Relaxed);
        true
    }

    #[inline]
    fn take_ownership(&self, me: ThreadToken) {
        self.owner.store(me.as_u64(), Ordering::Relaxed);
        self.depth.store(1, Ordering::Relaxed);
    }

    /// Release one level on behalf of `caller`
    fn release_from(&self, caller: ThreadToken) -> GuardResult<()> {
        let owner = self.owner.load(Ordering::Relaxed);
        if owner != caller.as_u64() {
            return Err(if owner == NO_OWNER {
                UsageError::NotHeld
            } else {
                UsageError::NotOwner {
                    owner,
                    caller: caller.as_u64(),
                }
            });
        }

        let depth = self.depth.load(Ordering::Relaxed);
        if depth == 0 {
            return Err(UsageError::NotHeld);
        }
        self.depth.store(depth - 1, Ordering::Relaxed);

        if depth == 1 {
            self.owner.store(NO_OWNER, Ordering::Relaxed);
            self.raw.unlock()?;
        }
        Ok(())
    }
}

impl<T: Default> Default for ReentrantMutex<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: ?Sized> std::fmt::Debug for ReentrantMutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReentrantMutex")
            .field("locked", &self.is_locked())
            .field("owner", &self.owner.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// One level of a held `ReentrantMutex`; releases on drop
///
/// Not `Send`: the release must happen on the owning thread.
pub struct ReentrantMutexGuard<'a, T: ?Sized> {
    lock: &'a ReentrantMutex<T>,
    held: bool,
    metadata: GuardMetadata,
    _not_send: PhantomData<*const ()>,
}

impl<'a, T: ?Sized> ReentrantMutexGuard<'a, T> {
    #[inline]
    fn new(lock: &'a ReentrantMutex<T>) -> Self {
        Self {
            lock,
            held: true,
            metadata: GuardMetadata::new(RESOURCE, LockMode::Exclusive),
            _not_send: PhantomData,
        }
    }

    fn unlock(&mut self) -> GuardResult<()> {
        if !self.held {
            return Err(UsageError::AlreadyReleased);
        }
        self.lock.release_from(ThreadToken::current())?;
        self.held = false;
        Ok(())
    }
}

impl<T: ?Sized> Guard for ReentrantMutexGuard<'_, T> {
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

impl<T: ?Sized> Deref for ReentrantMutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        assert!(self.held, "reentrant mutex guard used after release");
        // SAFETY: the calling thread owns the lock
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for ReentrantMutexGuard<'_, T> {
    fn drop(&mut self) {
        if self.held {
            if let Err(e) = self.unlock() {
                tracing::warn!(error = %e, "reentrant guard could not release on drop");
            }
        }
    }
}
