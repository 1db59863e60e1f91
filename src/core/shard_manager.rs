/*!
 * Shard Count Selection
 *
 * CPU-topology-aware default shard counts for the sharded map and set. The
 * host's parallelism is probed once; every later call is a table lookup.
 *
 * Shard counts are fixed for the life of a collection (no resharding), so the
 * default has to be generous enough for the busiest expected workload without
 * wasting memory on small hosts.
 */

use std::sync::OnceLock;

/// Global singleton for hardware-aware shard configuration
static SHARD_MANAGER: OnceLock<ShardManager> = OnceLock::new();

const MIN_SHARDS: usize = 8;
const MAX_SHARDS: usize = 512;

/// Hardware-aware shard count calculator
#[derive(Debug, Clone)]
pub struct ShardManager {
    cpu_count: usize,
}

impl ShardManager {
    fn instance() -> &'static Self {
        SHARD_MANAGER.get_or_init(|| {
            let cpu_count = std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or_else(|_| {
                    tracing::warn!("failed to detect CPU count, defaulting to 8");
                    8
                });

            tracing::debug!(cpu_count, "shard manager initialized");
            Self { cpu_count }
        })
    }

    /// Shard count for a workload profile
    ///
    /// Always a power of two in `[8, 512]`.
    pub fn shards(profile: WorkloadProfile) -> usize {
        let base = Self::instance().cpu_count;

        let multiplier = match profile {
            // Many writer threads on the same collection
            WorkloadProfile::HighContention => 4,
            // Mixed reads and writes from a thread pool
            WorkloadProfile::MediumContention => 2,
            // Mostly single-threaded or read-mostly
            WorkloadProfile::LowContention => 1,
        };

        (base * multiplier)
            .next_power_of_two()
            .clamp(MIN_SHARDS, MAX_SHARDS)
    }

    /// Default shard count for maps and sets built without an explicit count
    #[inline]
    pub fn default_shards() -> usize {
        Self::shards(WorkloadProfile::MediumContention)
    }

    /// Bound an externally supplied shard count to `[1, 512]`
    ///
    /// Used where the count comes from decoded data rather than the caller.
    #[inline]
    pub fn bounded(requested: usize) -> usize {
        requested.clamp(1, MAX_SHARDS)
    }

    /// CPU count detected at initialization
    pub fn cpu_count() -> usize {
        Self::instance().cpu_count
    }
}

/// Workload characterization for shard count calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkloadProfile {
    /// Shard count: 4x CPU cores
    HighContention,
    /// Shard count: 2x CPU cores
    #[default]
    MediumContention,
    /// Shard count: 1x CPU cores
    LowContention,
}
