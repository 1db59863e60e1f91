/*!
 * Condition-Based Parking
 *
 * The one blocking primitive every lock and queue in the crate parks on:
 * release the caller's state lock, sleep, reacquire, re-check.
 */

use super::wait::{WaitError, WaitResult, WakeResult};
use parking_lot::{Condvar, MutexGuard};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// A wait condition tied to whatever `parking_lot::Mutex` the caller passes in
///
/// The condition never owns state. Callers keep their state behind their own
/// mutex and describe "still blocked" with a predicate, so one mutex can serve
/// several conditions (a queue has `not_empty` and `not_full`).
///
/// # Performance
///
/// - Parking is delegated to `parking_lot::Condvar` (no spinning while the
///   state lock is held)
/// - Notify with no parked threads is a single atomic load
#[derive(Default)]
pub struct Condition {
    condvar: Condvar,
    waiters: AtomicUsize,
}

impl Condition {
    /// Create a new condition
    pub const fn new() -> Self {
        Self {
            condvar: Condvar::new(),
            waiters: AtomicUsize::new(0),
        }
    }

    /// Park while `blocked` holds, up to an optional deadline
    ///
    /// The predicate runs with the state lock held: once before parking and
    /// after every wakeup. It is evaluated one last time after the deadline
    /// passes, so a condition that became true right at the deadline is not
    /// reported as a timeout.
    pub fn wait_while<S, F>(
        &self,
        guard: &mut MutexGuard<'_, S>,
        deadline: Option<Instant>,
        mut blocked: F,
    ) -> WaitResult<()>
    where
        S: ?Sized,
        F: FnMut(&mut S) -> bool,
    {
        if !blocked(&mut **guard) {
            return Ok(());
        }

        self.waiters.fetch_add(1, Ordering::Relaxed);
        let result = loop {
            let timed_out = match deadline {
                Some(deadline) => self.condvar.wait_until(guard, deadline).timed_out(),
                None => {
                    self.condvar.wait(guard);
                    false
                }
            };

            if !blocked(&mut **guard) {
                break Ok(());
            }
            if timed_out {
                break Err(WaitError::Timeout);
            }
        };
        self.waiters.fetch_sub(1, Ordering::Relaxed);

        if result.is_err() {
            tracing::trace!(waiters = self.waiter_count(), "condition wait timed out");
        }
        result
    }

    /// Wake one parked thread
    #[inline]
    pub fn notify_one(&self) -> WakeResult {
        if self.condvar.notify_one() {
            WakeResult::Woken(1)
        } else {
            WakeResult::NoWaiters
        }
    }

    /// Wake every parked thread
    #[inline]
    pub fn notify_all(&self) -> WakeResult {
        WakeResult::from_count(self.condvar.notify_all())
    }

    /// Approximate count of threads inside `wait_while` (for diagnostics)
    #[inline]
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

impl std::fmt::Debug for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
