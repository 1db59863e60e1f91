/*!
 * syncx
 * Blocking locks and concurrent collections for preemptive multi-threaded code
 *
 * - Locks: `Mutex`, `ReentrantMutex`, `ReadWriteLock` with blocking, try and
 *   timed acquisition and scoped guards
 * - Collections: sharded `ConcurrentMap` / `ConcurrentSet` with snapshots,
 *   and `BoundedBlockingQueue`
 * - Harness: barrier-aligned throughput/latency measurement
 */

pub mod collections;
pub mod core;
pub mod harness;
pub mod locks;
pub mod monitoring;

// Re-exports
pub use collections::{
    BoundedBlockingQueue, ConcurrentMap, ConcurrentSet, HashKey, MapSnapshot, SetSnapshot, Value,
};
pub use crate::core::errors::{
    FullError, KeyError, QueueError, SnapshotError, SyncError, SyncResult, UsageError,
};
pub use crate::core::guard::{Guard, GuardMetadata, GuardResult, LockMode};
pub use crate::core::shard_manager::{ShardManager, WorkloadProfile};
pub use crate::core::sync::{StrategyType, SyncConfig};
pub use harness::{run_workers, HarnessConfig, Measurement, MeasurementRecord, Report};
pub use locks::{
    Mutex, MutexGuard, ReadGuard, ReadWriteLock, ReentrantMutex, ReentrantMutexGuard, WriteGuard,
};
pub use monitoring::init_tracing;
