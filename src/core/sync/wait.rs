/*!
 * Wait Outcomes
 *
 * Result types shared by every blocking operation, and the conversion from a
 * caller-supplied timeout to an absolute deadline.
 */

use std::time::{Duration, Instant};
use thiserror::Error;

/// Result type for wait operations
pub type WaitResult<T> = Result<T, WaitError>;

/// Wait operation errors
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    #[error("Wait operation timed out")]
    Timeout,
}

/// Outcome of a notify call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeResult {
    /// Number of parked threads that were unparked
    Woken(usize),
    /// Nobody was parked
    NoWaiters,
}

impl WakeResult {
    #[inline(always)]
    pub fn is_woken(&self) -> bool {
        matches!(self, WakeResult::Woken(_))
    }

    #[inline(always)]
    pub fn count(&self) -> usize {
        match self {
            WakeResult::Woken(n) => *n,
            WakeResult::NoWaiters => 0,
        }
    }

    #[inline]
    pub(crate) fn from_count(count: usize) -> Self {
        if count == 0 {
            WakeResult::NoWaiters
        } else {
            WakeResult::Woken(count)
        }
    }
}

/// Absolute deadline for a relative timeout
///
/// `None` means the timeout cannot be represented as an instant and the wait
/// is unbounded.
#[inline]
pub fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
