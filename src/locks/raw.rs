/*!
 * Raw Mutex
 *
 * Data-less exclusive lock shared by `Mutex` and `ReentrantMutex`.
 *
 * # Protocol
 *
 * - `locked` is the lock word; an uncontended acquire or release is one
 *   atomic compare-exchange
 * - Contended acquirers spin briefly (lock-free), then register in `parked`
 *   and park on `available` under the `gate` mutex
 * - A releaser that sees `parked > 0` takes `gate` and wakes one waiter
 *
 * `locked` and `parked` use sequentially consistent ordering: a waiter
 * increments `parked` before its final compare-exchange, and a releaser
 * clears `locked` before reading `parked`, so at least one of them observes
 * the other and no wakeup is lost.
 */

use crate::core::errors::UsageError;
use crate::core::sync::{deadline_after, Condition, SpinWait, SyncConfig};
use parking_lot::Mutex as StateMutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Exclusive lock with no owner tracking
pub struct RawMutex {
    locked: AtomicBool,
    parked: AtomicUsize,
    gate: StateMutex<()>,
    available: Condition,
    spin: SpinWait,
}

impl RawMutex {
    /// Create an unlocked mutex with the default spin policy
    pub fn new() -> Self {
        Self::with_spin(SpinWait::default())
    }

    /// Create an unlocked mutex with the spin policy from `config`
    pub fn with_config(config: &SyncConfig) -> Self {
        Self::with_spin(SpinWait::from_config(config))
    }

    fn with_spin(spin: SpinWait) -> Self {
        Self {
            locked: AtomicBool::new(false),
            parked: AtomicUsize::new(0),
            gate: StateMutex::new(()),
            available: Condition::new(),
            spin,
        }
    }

    /// Acquire without blocking
    #[inline]
    pub fn try_lock(&self) -> bool {
        self.locked
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
            .is_ok()
    }

    /// Acquire, blocking until available
    #[inline]
    pub fn lock(&self) {
        if !self.try_lock() {
            self.lock_slow(None);
        }
    }

    /// Acquire, blocking for at most `timeout`
    #[inline]
    pub fn try_lock_for(&self, timeout: Duration) -> bool {
        self.try_lock() || self.lock_slow(deadline_after(timeout))
    }

    /// Acquire, blocking until `deadline` at the latest
    #[inline]
    pub fn try_lock_until(&self, deadline: Instant) -> bool {
        self.try_lock() || self.lock_slow(Some(deadline))
    }

    #[cold]
    fn lock_slow(&self, deadline: Option<Instant>) -> bool {
        if self
            .spin
            .spin_until(|| !self.locked.load(Ordering::Relaxed) && self.try_lock())
        {
            return true;
        }

        let mut gate = self.gate.lock();
        self.parked.fetch_add(1, Ordering::SeqCst);
        let acquired = self
            .available
            .wait_while(&mut gate, deadline, |_| !self.try_lock())
            .is_ok();
        self.parked.fetch_sub(1, Ordering::SeqCst);
        drop(gate);

        if !acquired {
            tracing::trace!("raw mutex acquire timed out");
        }
        acquired
    }

    /// Release and wake one parked waiter
    ///
    /// Fails with `UsageError::NotHeld` if the mutex is not locked.
    #[inline]
    pub fn unlock(&self) -> Result<(), UsageError> {
        if self
            .locked
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return Err(UsageError::NotHeld);
        }

        if self.parked.load(Ordering::SeqCst) > 0 {
            let _gate = self.gate.lock();
            self.available.notify_one();
        }
        Ok(())
    }

    /// Advisory, point-in-time view of the lock word
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::Relaxed)
    }

    /// Approximate number of parked acquirers
    #[inline]
    pub fn parked_count(&self) -> usize {
        self.parked.load(Ordering::Relaxed)
    }
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RawMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMutex")
            .field("locked", &self.is_locked())
            .field("parked", &self.parked_count())
            .finish()
    }
}
