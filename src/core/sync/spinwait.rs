/*!
 * Bounded Spin-Wait
 *
 * Optimistic retry loop run before parking. The caller's attempt closure must
 * not hold any internal lock between iterations.
 */

use super::config::{StrategyType, SyncConfig};
use std::thread;
use std::time::{Duration, Instant};

/// Bounded spin budget
///
/// # Performance
///
/// - Ultra-low latency when the lock is released within a few microseconds
/// - Burns CPU while spinning, so the budget stays small
#[derive(Debug, Clone, Copy)]
pub struct SpinWait {
    /// Spin duration before giving up
    spin_duration: Duration,
    /// Maximum spin iterations
    max_spins: u32,
}

impl SpinWait {
    /// Create a new spin budget
    pub const fn new(spin_duration: Duration, max_spins: u32) -> Self {
        Self {
            spin_duration,
            max_spins,
        }
    }

    /// A budget that never spins
    pub const fn disabled() -> Self {
        Self::new(Duration::ZERO, 0)
    }

    /// Derive the budget from a configuration
    pub fn from_config(config: &SyncConfig) -> Self {
        match config.select_strategy() {
            StrategyType::SpinThenPark => Self::new(config.spin_duration, config.max_spins),
            _ => Self::disabled(),
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.max_spins > 0
    }

    /// Retry `attempt` until it succeeds or the budget runs out
    ///
    /// Returns true if `attempt` succeeded.
    pub fn spin_until(&self, mut attempt: impl FnMut() -> bool) -> bool {
        if !self.is_enabled() {
            return false;
        }

        let start = Instant::now();
        let mut spin_count: u32 = 0;

        loop {
            if attempt() {
                return true;
            }

            spin_count += 1;
            if spin_count >= self.max_spins || start.elapsed() >= self.spin_duration {
                return false;
            }

            // Yield to scheduler occasionally
            if spin_count % 10 == 0 {
                thread::yield_now();
            } else {
                std::hint::spin_loop();
            }
        }
    }
}

impl Default for SpinWait {
    fn default() -> Self {
        Self::from_config(&SyncConfig::default())
    }
}
