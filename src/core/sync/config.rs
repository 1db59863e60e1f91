/*!
 * Synchronization Configuration
 *
 * Runtime configuration for how blocking acquisitions wait
 */

use std::sync::OnceLock;
use std::time::Duration;

/// Strategy type selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyType {
    /// Park immediately on contention
    Park,
    /// Spin briefly (without holding any internal lock), then park
    SpinThenPark,
    /// Spin on multi-core hosts, park on single-core hosts
    Auto,
}

impl std::str::FromStr for StrategyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "park" => Ok(StrategyType::Park),
            "spin" | "spin_then_park" | "spinthenpark" => Ok(StrategyType::SpinThenPark),
            "auto" => Ok(StrategyType::Auto),
            other => Err(format!("unknown sync strategy '{other}'")),
        }
    }
}

/// Synchronization configuration
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Preferred strategy
    pub strategy: StrategyType,
    /// Spin duration before parking (for SpinThenPark)
    pub spin_duration: Duration,
    /// Maximum spin iterations before parking
    pub max_spins: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyType::Auto,
            spin_duration: Duration::from_micros(10),
            max_spins: 100,
        }
    }
}

impl SyncConfig {
    /// Configuration optimized for very short critical sections
    pub const fn low_latency() -> Self {
        Self {
            strategy: StrategyType::SpinThenPark,
            spin_duration: Duration::from_micros(50),
            max_spins: 500,
        }
    }

    /// Configuration optimized for long holds (> 1ms expected)
    pub const fn long_wait() -> Self {
        Self {
            strategy: StrategyType::Park,
            spin_duration: Duration::from_micros(1),
            max_spins: 0,
        }
    }

    /// Build from environment, falling back to defaults field by field
    ///
    /// Environment variables:
    /// - SYNCX_STRATEGY: park | spin | auto (default: auto)
    /// - SYNCX_MAX_SPINS: spin iterations before parking (default: 100)
    /// - SYNCX_SPIN_MICROS: spin time budget in microseconds (default: 10)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = std::env::var("SYNCX_STRATEGY") {
            match raw.parse() {
                Ok(strategy) => config.strategy = strategy,
                Err(e) => tracing::warn!(error = %e, "ignoring SYNCX_STRATEGY"),
            }
        }
        if let Some(spins) = env_number::<u32>("SYNCX_MAX_SPINS") {
            config.max_spins = spins;
        }
        if let Some(micros) = env_number::<u64>("SYNCX_SPIN_MICROS") {
            config.spin_duration = Duration::from_micros(micros);
        }

        config
    }

    /// Resolve `Auto` for the current host
    ///
    /// The host probe runs once per process; later calls read the cached result.
    pub fn select_strategy(&self) -> StrategyType {
        match self.strategy {
            StrategyType::Auto => *AUTO_STRATEGY.get_or_init(|| {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                let resolved = if cores > 1 {
                    StrategyType::SpinThenPark
                } else {
                    StrategyType::Park
                };
                tracing::debug!(cores, strategy = ?resolved, "auto sync strategy resolved");
                resolved
            }),
            other => other,
        }
    }
}

/// `Auto` resolved against the host, computed on first use
static AUTO_STRATEGY: OnceLock<StrategyType> = OnceLock::new();

pub(crate) fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring non-numeric setting");
            None
        }
    }
}
