/*!
 * RAII Lock Guards
 *
 * Shared vocabulary for the guards handed out by every lock in the crate.
 *
 * ## Design Principles
 *
 * 1. **Single use**: a guard releases exactly once, explicitly or on drop
 * 2. **Observable**: guards know what they hold and since when
 * 3. **Borrowed back-reference**: a guard borrows its lock, so the lock
 *    outlives every guard without reference cycles
 *
 * ## Example
 *
 * ```ignore
 * use syncx::{Guard, Mutex};
 *
 * let lock = Mutex::new(0u32);
 * let mut guard = lock.acquire();
 * *guard += 1;
 * guard.release().unwrap();
 * assert!(guard.release().is_err()); // second release is a usage error
 * ```
 */

mod traits;

pub use traits::Guard;

use crate::core::errors::UsageError;
use std::time::{Duration, Instant};

/// Result type for guard operations
pub type GuardResult<T> = Result<T, UsageError>;

/// Access mode a guard was acquired in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    /// Sole holder of a mutex
    Exclusive,
    /// One of possibly many readers
    Read,
    /// Sole writer of a reader/writer lock
    Write,
}

impl LockMode {
    #[inline]
    pub fn is_shared(&self) -> bool {
        matches!(self, LockMode::Read)
    }
}

/// Guard metadata for observability
#[derive(Debug, Clone)]
pub struct GuardMetadata {
    pub resource_type: &'static str,
    pub mode: LockMode,
    pub acquired_at: Instant,
}

impl GuardMetadata {
    #[inline]
    pub fn new(resource_type: &'static str, mode: LockMode) -> Self {
        Self {
            resource_type,
            mode,
            acquired_at: Instant::now(),
        }
    }

    /// Time since acquisition
    #[inline]
    pub fn held_for(&self) -> Duration {
        self.acquired_at.elapsed()
    }

    #[inline]
    pub fn lifetime_micros(&self) -> u64 {
        self.held_for().as_micros() as u64
    }
}
