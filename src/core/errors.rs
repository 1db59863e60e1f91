/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::core::serialization::SnapshotError;

/// Lock misuse: releasing what is not held, or releasing from the wrong thread
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum UsageError {
    #[error("Guard already released")]
    #[diagnostic(
        code(usage::already_released),
        help("A guard releases exactly once. Drop it or call release() a single time.")
    )]
    AlreadyReleased,

    #[error("Lock owned by thread {owner}, release attempted from thread {caller}")]
    #[diagnostic(
        code(usage::not_owner),
        help("Reentrant locks must be released by the thread that acquired them.")
    )]
    NotOwner { owner: u64, caller: u64 },

    #[error("Lock is not held")]
    #[diagnostic(
        code(usage::not_held),
        help("Release calls must balance acquire calls.")
    )]
    NotHeld,
}

/// Key-family errors raised by the sharded map and set
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum KeyError {
    #[error("Key not found")]
    #[diagnostic(
        code(key::missing),
        help("Use the defaulting variant (get_or, pop_or) or check contains() first.")
    )]
    MissingKey,

    #[error("Unhashable type: '{type_name}'")]
    #[diagnostic(
        code(key::unhashable),
        help("Mutable sequences cannot be used as keys. Convert lists to tuples.")
    )]
    UnhashableKey { type_name: String },
}

impl KeyError {
    #[inline]
    pub fn unhashable(type_name: impl Into<String>) -> Self {
        KeyError::UnhashableKey {
            type_name: type_name.into(),
        }
    }
}

/// Capacity-family errors raised by the blocking queue
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum QueueError {
    #[error("Queue is full")]
    #[diagnostic(
        code(queue::full),
        help("Retry later, use the blocking put(), or raise the queue capacity.")
    )]
    Full,

    #[error("Queue is empty")]
    #[diagnostic(code(queue::empty), help("Retry later or use the blocking get()."))]
    Empty,
}

/// Rejected put: the queue was full. The item is handed back untouched.
#[derive(Error, Clone, PartialEq, Eq)]
#[error("Queue is full")]
pub struct FullError<T>(pub T);

impl<T> FullError<T> {
    /// Recover the item that could not be enqueued
    #[inline]
    pub fn into_inner(self) -> T {
        self.0
    }
}

// Manual impl: the rejected item need not be Debug
impl<T> std::fmt::Debug for FullError<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FullError(..)")
    }
}

impl<T> From<FullError<T>> for QueueError {
    fn from(_: FullError<T>) -> Self {
        QueueError::Full
    }
}

/// Unified error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum SyncError {
    #[error("Usage error: {0}")]
    #[diagnostic(transparent)]
    Usage(#[from] UsageError),

    #[error("Key error: {0}")]
    #[diagnostic(transparent)]
    Key(#[from] KeyError),

    #[error("Queue error: {0}")]
    #[diagnostic(transparent)]
    Queue(#[from] QueueError),

    #[error("Snapshot error: {0}")]
    #[diagnostic(
        code(snapshot::codec),
        help("Snapshot blobs must come from to_bytes() of the same format version.")
    )]
    Snapshot(#[from] SnapshotError),
}

impl<T> From<FullError<T>> for SyncError {
    fn from(err: FullError<T>) -> Self {
        SyncError::Queue(err.into())
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
