/*!
 * Binary Serialization with bincode
 * Versioned framing for snapshot blobs
 *
 * # Format
 *
 * `[1-byte version][4-byte little-endian length][bincode payload]`
 *
 * The version byte is checked before anything else is decoded, so a blob from
 * an incompatible build fails fast with `InvalidVersion` instead of producing
 * garbage entries.
 */

use serde::{de::DeserializeOwned, Serialize};

/// Format version for snapshot blobs
pub const SNAPSHOT_FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = 5;

/// Result type for snapshot encoding
pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot encoding errors with context
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("Serialization failed: {context}")]
    Serialization {
        context: &'static str,
        #[source]
        source: Box<bincode::ErrorKind>,
    },

    #[error("Deserialization failed: {context}")]
    Deserialization {
        context: &'static str,
        #[source]
        source: Box<bincode::ErrorKind>,
    },

    #[error("Buffer too small: expected {expected} bytes, got {actual} bytes")]
    BufferTooSmall { expected: usize, actual: usize },

    #[error("Invalid format version: expected {expected}, got {actual}")]
    InvalidVersion { expected: u8, actual: u8 },

    #[error("Payload too large: {0} bytes")]
    PayloadTooLarge(usize),
}

/// Serialize to binary bytes using bincode
#[inline]
pub fn to_vec<T: Serialize>(value: &T) -> SnapshotResult<Vec<u8>> {
    bincode::serialize(value).map_err(|source| SnapshotError::Serialization {
        context: "standard serialization",
        source,
    })
}

/// Deserialize from binary bytes using bincode
///
/// Matches the output of `to_vec()`.
#[inline]
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> SnapshotResult<T> {
    bincode::deserialize(bytes).map_err(|source| SnapshotError::Deserialization {
        context: "standard deserialization",
        source,
    })
}

/// Get the serialized size of a value without serializing it
#[inline]
pub fn serialized_size<T: Serialize>(value: &T) -> SnapshotResult<u64> {
    bincode::serialized_size(value).map_err(|source| SnapshotError::Serialization {
        context: "size calculation",
        source,
    })
}

/// Serialize with version and size prefix
pub fn to_vec_with_header<T: Serialize>(value: &T) -> SnapshotResult<Vec<u8>> {
    let data = to_vec(value)?;
    let len = u32::try_from(data.len()).map_err(|_| SnapshotError::PayloadTooLarge(data.len()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + data.len());
    result.push(SNAPSHOT_FORMAT_VERSION);
    result.extend_from_slice(&len.to_le_bytes());
    result.extend_from_slice(&data);

    Ok(result)
}

/// Deserialize from the versioned size-prefixed format
pub fn from_slice_with_header<T: DeserializeOwned>(bytes: &[u8]) -> SnapshotResult<T> {
    if bytes.len() < HEADER_LEN {
        return Err(SnapshotError::BufferTooSmall {
            expected: HEADER_LEN,
            actual: bytes.len(),
        });
    }

    let version = bytes[0];
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(SnapshotError::InvalidVersion {
            expected: SNAPSHOT_FORMAT_VERSION,
            actual: version,
        });
    }

    let len = u32::from_le_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;
    if bytes.len() < HEADER_LEN + len {
        return Err(SnapshotError::BufferTooSmall {
            expected: HEADER_LEN + len,
            actual: bytes.len(),
        });
    }

    from_slice(&bytes[HEADER_LEN..HEADER_LEN + len])
}
