/*!
 * Collection Snapshots
 *
 * Point-in-time copies of a map or set, detached from any lock state. A
 * snapshot can be restored into a new live collection or carried as an
 * opaque, versioned byte blob.
 *
 * # Blob layout
 *
 * `[format version: u8][payload length: u32 LE][bincode payload]`
 */

use super::key::HashKey;
use super::map::ConcurrentMap;
use super::set::ConcurrentSet;
use crate::core::errors::KeyError;
use crate::core::shard_manager::ShardManager;
use crate::core::serialization::{from_slice_with_header, to_vec_with_header, SnapshotResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Entries of a `ConcurrentMap` as of one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot<K, V> {
    shard_count: usize,
    entries: Vec<(K, V)>,
}

impl<K, V> MapSnapshot<K, V> {
    pub(crate) fn new(shard_count: usize, entries: Vec<(K, V)>) -> Self {
        Self {
            shard_count,
            entries,
        }
    }

    /// Shard count of the collection the snapshot was taken from
    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(K, V)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(K, V)> {
        self.entries
    }
}

impl<K: HashKey, V> MapSnapshot<K, V> {
    /// Build a new live map with the captured entries and shard count
    ///
    /// Keys are re-hashed; a blob carrying an unhashable key fails here.
    /// The shard count is bounded to `[1, 512]`.
    pub fn restore(self) -> Result<ConcurrentMap<K, V>, KeyError> {
        let map = ConcurrentMap::with_shards(ShardManager::bounded(self.shard_count));
        for (key, value) in self.entries {
            map.set(key, value)?;
        }
        tracing::debug!(entries = map.len(), "map snapshot restored");
        Ok(map)
    }
}

impl<K: Serialize, V: Serialize> MapSnapshot<K, V> {
    /// Encode as a versioned blob
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        to_vec_with_header(self)
    }
}

impl<K: DeserializeOwned, V: DeserializeOwned> MapSnapshot<K, V> {
    /// Decode a blob produced by `to_bytes`
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        from_slice_with_header(bytes)
    }
}

/// Members of a `ConcurrentSet` as of one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSnapshot<T> {
    shard_count: usize,
    members: Vec<T>,
}

impl<T> SetSnapshot<T> {
    pub(crate) fn new(shard_count: usize, members: Vec<T>) -> Self {
        Self {
            shard_count,
            members,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> &[T] {
        &self.members
    }

    pub fn into_members(self) -> Vec<T> {
        self.members
    }
}

impl<T: HashKey> SetSnapshot<T> {
    /// Build a new live set with the captured members and shard count
    pub fn restore(self) -> Result<ConcurrentSet<T>, KeyError> {
        let set = ConcurrentSet::with_shards(ShardManager::bounded(self.shard_count));
        for member in self.members {
            set.add(member)?;
        }
        tracing::debug!(members = set.len(), "set snapshot restored");
        Ok(set)
    }
}

impl<T: Serialize> SetSnapshot<T> {
    pub fn to_bytes(&self) -> SnapshotResult<Vec<u8>> {
        to_vec_with_header(self)
    }
}

impl<T: DeserializeOwned> SetSnapshot<T> {
    pub fn from_bytes(bytes: &[u8]) -> SnapshotResult<Self> {
        from_slice_with_header(bytes)
    }
}
