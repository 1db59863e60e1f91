/*!
 * Core Module
 * Error taxonomy, guard vocabulary, parking infrastructure, and snapshot encoding
 */

pub mod errors;
pub mod guard;
pub mod serialization;
pub mod shard_manager;
pub mod sync;

// Re-export for convenience
pub use errors::*;
pub use guard::{Guard, GuardMetadata, GuardResult, LockMode};
pub use shard_manager::{ShardManager, WorkloadProfile};
pub use sync::{Condition, StrategyType, SyncConfig, ThreadToken, WaitError, WakeResult};
