/*!
 * Serialization Utilities
 *
 * Binary encoding for snapshot blobs:
 * - Bincode payloads (compact, fast) behind a one-byte format version
 * - Versioned, length-prefixed framing so blobs can be concatenated or streamed
 *
 * # Use Cases
 *
 * - **Snapshots**: point-in-time copies of maps and sets carried as opaque bytes
 * - **Harness output** uses serde_json directly and does not go through here
 */

pub mod bincode;

pub use bincode::{
    from_slice as from_bincode, from_slice_with_header, serialized_size, to_vec as to_bincode,
    to_vec_with_header, SnapshotError, SnapshotResult, SNAPSHOT_FORMAT_VERSION,
};
