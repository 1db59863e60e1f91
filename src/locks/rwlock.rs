/*!
 * Read-Write Lock
 *
 * Many readers or one writer, with writer preference: once a writer is
 * waiting, new readers queue behind it, so a steady stream of readers cannot
 * starve writers.
 *
 * # State
 *
 * `readers`, `writer_active` and `waiting_writers` live behind one state
 * mutex. Readers park on `readable`, writers on `writable`; both conditions
 * re-check the admission predicate after every wakeup.
 *
 * A thread that already holds a read lock and asks for another while a writer
 * is waiting will deadlock. Read access is not reentrant.
 */

use crate::core::errors::UsageError;
use crate::core::guard::{Guard, GuardMetadata, GuardResult, LockMode};
use crate::core::sync::{deadline_after, Condition};
use parking_lot::Mutex as StateMutex;
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

const RESOURCE: &str = "rwlock";

#[derive(Debug, Default)]
struct RwState {
    readers: usize,
    writer_active: bool,
    waiting_writers: usize,
}

impl RwState {
    #[inline]
    fn reader_blocked(&self) -> bool {
        self.writer_active || self.waiting_writers > 0
    }

    #[inline]
    fn writer_blocked(&self) -> bool {
        self.writer_active || self.readers > 0
    }
}

/// Shared/exclusive lock with writer preference
pub struct ReadWriteLock<T: ?Sized = ()> {
    state: StateMutex<RwState>,
    readable: Condition,
    writable: Condition,
    data: UnsafeCell<T>,
}

// SAFETY: readers get `&T` concurrently, writers get `&mut T` exclusively
unsafe impl<T: ?Sized + Send> Send for ReadWriteLock<T> {}
unsafe impl<T: ?Sized + Send + Sync> Sync for ReadWriteLock<T> {}

impl<T> ReadWriteLock<T> {
    /// Create an unlocked read-write lock
    pub fn new(data: T) -> Self {
        Self {
            state: StateMutex::new(RwState::default()),
            readable: Condition::new(),
            writable: Condition::new(),
            data: UnsafeCell::new(data),
        }
    }

    /// Consume the lock, returning the data
    pub fn into_inner(self) -> T {
        self.data.into_inner()
    }
}

impl<T: ?Sized> ReadWriteLock<T> {
    /// Acquire shared access, blocking while a writer holds or waits
    pub fn acquire_read(&self) -> ReadGuard<'_, T> {
        let acquired = self.lock_shared(None);
        debug_assert!(acquired);
        ReadGuard::new(self)
    }

    /// Acquire shared access if no writer holds or waits right now
    pub fn try_acquire_read(&self) -> Option<ReadGuard<'_, T>> {
        let mut state = self.state.lock();
        if state.reader_blocked() {
            return None;
        }
        state.readers += 1;
        Some(ReadGuard::new(self))
    }

    /// Acquire shared access, waiting at most `timeout`
    pub fn acquire_read_timeout(&self, timeout: Duration) -> Option<ReadGuard<'_, T>> {
        self.lock_shared(deadline_after(timeout))
            .then(|| ReadGuard::new(self))
    }

    /// Acquire shared access, waiting until `deadline` at the latest
    pub fn acquire_read_until(&self, deadline: Instant) -> Option<ReadGuard<'_, T>> {
        self.lock_shared(Some(deadline))
            .then(|| ReadGuard::new(self))
    }

    /// Acquire exclusive access, blocking until no reader or writer holds
    pub fn acquire_write(&self) -> WriteGuard<'_, T> {
        let acquired = self.lock_exclusive(None);
        debug_assert!(acquired);
        WriteGuard::new(self)
    }

    /// Acquire exclusive access if the lock is free right now
    pub fn try_acquire_write(&self) -> Option<WriteGuard<'_, T>> {
        let mut state = self.state.lock();
        if state.writer_blocked() {
            return None;
        }
        state.writer_active = true;
        Some(WriteGuard::new(self))
    }

    /// Acquire exclusive access, waiting at most `timeout`
    ///
    /// A writer that gives up withdraws its claim and wakes the readers it
    /// was holding back.
    pub fn acquire_write_timeout(&self, timeout: Duration) -> Option<WriteGuard<'_, T>> {
        self.lock_exclusive(deadline_after(timeout))
            .then(|| WriteGuard::new(self))
    }

    /// Acquire exclusive access, waiting until `deadline` at the latest
    pub fn acquire_write_until(&self, deadline: Instant) -> Option<WriteGuard<'_, T>> {
        self.lock_exclusive(Some(deadline))
            .then(|| WriteGuard::new(self))
    }

    /// Run `f` with shared access
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.acquire_read();
        f(&guard)
    }

    /// Run `f` with exclusive access
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.acquire_write();
        f(&mut guard)
    }

    /// Held in either mode (advisory)
    pub fn is_locked(&self) -> bool {
        let state = self.state.lock();
        state.writer_active || state.readers > 0
    }

    /// Held by a writer (advisory)
    pub fn is_write_locked(&self) -> bool {
        self.state.lock().writer_active
    }

    /// Current number of readers (advisory)
    pub fn reader_count(&self) -> usize {
        self.state.lock().readers
    }

    /// Writers currently parked (advisory)
    pub fn waiting_writers(&self) -> usize {
        self.state.lock().waiting_writers
    }

    /// Mutable access without locking (exclusive borrow proves no guard exists)
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    fn lock_shared(&self, deadline: Option<Instant>) -> bool {
        let mut state = self.state.lock();
        if self
            .readable
            .wait_while(&mut state, deadline, |s| s.reader_blocked())
            .is_err()
        {
            tracing::trace!(resource = RESOURCE, "read acquire timed out");
            return false;
        }
        state.readers += 1;
        true
    }

    fn lock_exclusive(&self, deadline: Option<Instant>) -> bool {
        let mut state = self.state.lock();
        state.waiting_writers += 1;
        let result = self
            .writable
            .wait_while(&mut state, deadline, |s| s.writer_blocked());
        state.waiting_writers -= 1;

        if result.is_ok() {
            state.writer_active = true;
            return true;
        }

        let release_readers = state.waiting_writers == 0 && !state.writer_active;
        drop(state);
        tracing::trace!(resource = RESOURCE, release_readers, "write acquire timed out");
        if release_readers {
            self.readable.notify_all();
        }
        false
    }

    fn unlock_shared(&self) -> GuardResult<()> {
        let mut state = self.state.lock();
        if state.readers == 0 {
            return Err(UsageError::NotHeld);
        }
        state.readers -= 1;
        let wake_writer = state.readers == 0 && state.waiting_writers > 0;
        drop(state);

        if wake_writer {
            self.writable.notify_one();
        }
        Ok(())
    }

    fn unlock_exclusive(&self) -> GuardResult<()> {
        let mut state = self.state.lock();
        if !state.writer_active {
            return Err(UsageError::NotHeld);
        }
        state.writer_active = false;
        let wake_writer = state.waiting_writers > 0;
        drop(state);

        self.readable.notify_all();
        if wake_writer {
            self.writable.notify_one();
        }
        Ok(())
    }

    fn downgrade_exclusive(&self) -> GuardResult<()> {
        let mut state = self.state.lock();
        if !state.writer_active {
            return Err(UsageError::NotHeld);
        }
        state.writer_active = false;
        state.readers += 1;
        drop(state);

        self.readable.notify_all();
        Ok(())
    }
}

impl<T: Default> Default for ReadWriteLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> From<T> for ReadWriteLock<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

impl<T: ?Sized> std::fmt::Debug for ReadWriteLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReadWriteLock")
            .field("readers", &state.readers)
            .field("writer_active", &state.writer_active)
            .field("waiting_writers", &state.waiting_writers)
            .finish_non_exhaustive()
    }
}

/// Shared hold on a `ReadWriteLock`; releases on drop
pub struct ReadGuard<'a, T: ?Sized> {
    lock: &'a ReadWriteLock<T>,
    held: bool,
    metadata: GuardMetadata,
}

// SAFETY: a read guard only hands out `&T`
unsafe impl<T: ?Sized + Sync> Send for ReadGuard<'_, T> {}
unsafe impl<T: ?Sized + Sync> Sync for ReadGuard<'_, T> {}

impl<'a, T: ?Sized> ReadGuard<'a, T> {
    #[inline]
    fn new(lock: &'a ReadWriteLock<T>) -> Self {
        Self {
            lock,
            held: true,
            metadata: GuardMetadata::new(RESOURCE, LockMode::Read),
        }
    }

    fn unlock(&mut self) -> GuardResult<()> {
        if !self.held {
            return Err(UsageError::AlreadyReleased);
        }
        self.held = false;
        self.lock.unlock_shared()
    }
}

impl<T: ?Sized> Guard for ReadGuard<'_, T> {
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

impl<T: ?Sized> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        assert!(self.held, "read guard used after release");
        // SAFETY: no writer is active while a read hold exists
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        if self.held {
            let _ = self.unlock();
        }
    }
}

/// Exclusive hold on a `ReadWriteLock`; releases on drop
pub struct WriteGuard<'a, T: ?Sized> {
    lock: &'a ReadWriteLock<T>,
    held: bool,
    metadata: GuardMetadata,
}

// SAFETY: the write hold is exclusive and carries no thread identity
unsafe impl<T: ?Sized + Send + Sync> Send for WriteGuard<'_, T> {}
unsafe impl<T: ?Sized + Sync> Sync for WriteGuard<'_, T> {}

impl<'a, T: ?Sized> WriteGuard<'a, T> {
    #[inline]
    fn new(lock: &'a ReadWriteLock<T>) -> Self {
        Self {
            lock,
            held: true,
            metadata: GuardMetadata::new(RESOURCE, LockMode::Write),
        }
    }

    /// Turn the write hold into a read hold without letting a writer in between
    ///
    /// Waiting readers are woken; writers stay blocked until the read hold is
    /// released.
    pub fn downgrade(mut self) -> GuardResult<ReadGuard<'a, T>> {
        if !self.held {
            return Err(UsageError::AlreadyReleased);
        }
        self.held = false;
        self.lock.downgrade_exclusive()?;
        Ok(ReadGuard::new(self.lock))
    }

    fn unlock(&mut self) -> GuardResult<()> {
        if !self.held {
            return Err(UsageError::AlreadyReleased);
        }
        self.held = false;
        self.lock.unlock_exclusive()
    }
}

impl<T: ?Sized> Guard for WriteGuard<'_, T> {
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

impl<T: ?Sized> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        assert!(self.held, "write guard used after release");
        // SAFETY: the write hold is exclusive
        unsafe { &*self.lock.data.get() }
    }
}

impl<T: ?Sized> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        assert!(self.held, "write guard used after release");
        // SAFETY: the write hold is exclusive and the guard is borrowed mutably
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T: ?Sized> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        if self.held {
            let _ = self.unlock();
        }
    }
}
