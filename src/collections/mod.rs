/*!
 * Concurrent Collections
 *
 * - `ConcurrentMap` / `ConcurrentSet`: sharded hash containers with fallible
 *   key hashing and point-in-time snapshots
 * - `BoundedBlockingQueue`: MPMC FIFO with blocking, timed and non-blocking
 *   put/get
 */

mod key;
mod map;
mod queue;
mod set;
mod shard;
mod snapshot;
mod value;

pub use key::HashKey;
pub use map::ConcurrentMap;
pub use queue::BoundedBlockingQueue;
pub use set::ConcurrentSet;
pub use snapshot::{MapSnapshot, SetSnapshot};
pub use value::Value;
