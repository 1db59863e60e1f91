/*!
 * Guard Traits
 *
 * Core abstraction for RAII lock guards
 */

use super::{GuardMetadata, GuardResult, LockMode};

/// Core guard trait
///
/// All lock guards implement this to provide:
/// - Resource type identification
/// - Metadata access
/// - Manual release capability
///
/// Dropping an active guard releases it. `release` exists for callers that
/// want the release to happen at a precise point and to observe misuse.
pub trait Guard {
    /// Resource type name for logging/debugging
    fn resource_type(&self) -> &'static str {
        self.metadata().resource_type
    }

    /// Get guard metadata
    fn metadata(&self) -> &GuardMetadata;

    /// Mode the lock is held in
    fn mode(&self) -> LockMode {
        self.metadata().mode
    }

    /// Check if guard still holds its lock
    fn is_active(&self) -> bool;

    /// Manually release the lock
    ///
    /// Returns `Err(UsageError::AlreadyReleased)` if already released
    fn release(&mut self) -> GuardResult<()>;
}
