/*!
 * Sharded Concurrent Map
 *
 * Hash map partitioned into independently locked shards.
 *
 * # Performance
 *
 * - Single-key operations lock one shard; threads working on keys in
 *   different shards never contend
 * - `len()` sums per-shard counters without locking
 * - `clear()`, `snapshot()` and the listing methods lock every shard in
 *   ascending order, so they are exact but stall writers for their duration
 *
 * # Example
 *
 * ```ignore
 * let map = ConcurrentMap::new();
 * map.set("hits", 0u64)?;
 * map.update(&"hits", |n| *n += 1)?;
 * assert_eq!(map.get(&"hits")?, 1);
 * ```
 */

use super::key::HashKey;
use super::shard::Shards;
use super::snapshot::MapSnapshot;
use crate::core::errors::KeyError;
use crate::core::shard_manager::{ShardManager, WorkloadProfile};

/// Thread-safe map over `HashKey` keys
pub struct ConcurrentMap<K, V> {
    shards: Shards<K, V>,
}

impl<K: HashKey, V> ConcurrentMap<K, V> {
    /// Create with the default shard count for this host
    pub fn new() -> Self {
        Self::with_shards(ShardManager::default_shards())
    }

    /// Create with an explicit shard count (panics if zero)
    pub fn with_shards(shard_count: usize) -> Self {
        Self {
            shards: Shards::new(shard_count),
        }
    }

    /// Create with a shard count sized for `profile`
    pub fn with_profile(profile: WorkloadProfile) -> Self {
        Self::with_shards(ShardManager::shards(profile))
    }

    /// Build from entries; later duplicates overwrite earlier ones
    pub fn from_entries(entries: impl IntoIterator<Item = (K, V)>) -> Result<Self, KeyError> {
        let map = Self::new();
        for (key, value) in entries {
            map.set(key, value)?;
        }
        Ok(map)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.count()
    }

    /// Value for `key`; `MissingKey` if absent
    pub fn get(&self, key: &K) -> Result<V, KeyError>
    where
        V: Clone,
    {
        self.with_value(key, V::clone)?.ok_or(KeyError::MissingKey)
    }

    /// Value for `key`, or `default` if absent
    ///
    /// Still fails with `UnhashableKey` for an unhashable key.
    pub fn get_or(&self, key: &K, default: V) -> Result<V, KeyError>
    where
        V: Clone,
    {
        Ok(self.with_value(key, V::clone)?.unwrap_or(default))
    }

    /// Insert or overwrite, returning the previous value
    pub fn set(&self, key: K, value: V) -> Result<Option<V>, KeyError> {
        let hash = self.shards.hash(&key)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.insert(hash, key, value)))
    }

    /// Remove `key`; `MissingKey` if absent
    pub fn delete(&self, key: &K) -> Result<(), KeyError> {
        self.pop(key).map(drop)
    }

    /// Remove and return the value for `key`; `MissingKey` if absent
    pub fn pop(&self, key: &K) -> Result<V, KeyError> {
        let hash = self.shards.hash(key)?;
        self.shards
            .with_shard(hash, |table| table.remove(hash, key))
            .ok_or(KeyError::MissingKey)
    }

    /// Remove and return the value for `key`, or `default` without mutating
    pub fn pop_or(&self, key: &K, default: V) -> Result<V, KeyError> {
        let hash = self.shards.hash(key)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.remove(hash, key))
            .unwrap_or(default))
    }

    /// Stored value for `key`, inserting `default` first if absent
    ///
    /// Atomic per key: concurrent callers with the same key all observe the
    /// value of whichever insert won.
    pub fn setdefault(&self, key: K, default: V) -> Result<V, KeyError>
    where
        V: Clone,
    {
        let hash = self.shards.hash(&key)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.get_or_insert_with(hash, key, || default).clone()))
    }

    pub fn contains(&self, key: &K) -> Result<bool, KeyError> {
        Ok(self.with_value(key, |_| ())?.is_some())
    }

    /// Run `f` on the value for `key` with its shard locked
    ///
    /// `Ok(None)` if the key is absent.
    pub fn with_value<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Result<Option<R>, KeyError> {
        let hash = self.shards.hash(key)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.get(hash, key).map(f)))
    }

    /// Mutate the value for `key` in place with its shard locked
    ///
    /// `Ok(None)` if the key is absent.
    pub fn update<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Result<Option<R>, KeyError> {
        let hash = self.shards.hash(key)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.get_mut(hash, key).map(f)))
    }

    /// Entry count from per-shard counters
    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry
    pub fn clear(&self) {
        let mut all = self.shards.lock_all();
        let removed = all.len();
        all.clear();
        drop(all);
        tracing::debug!(removed, shards = self.shard_count(), "map cleared");
    }

    /// Keys as of one instant
    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.shards.lock_all().iter().map(|(k, _)| k.clone()).collect()
    }

    /// Values as of one instant
    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.shards.lock_all().iter().map(|(_, v)| v.clone()).collect()
    }

    /// Entries as of one instant
    pub fn items(&self) -> Vec<(K, V)>
    where
        K: Clone,
        V: Clone,
    {
        self.shards
            .lock_all()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Frozen copy of every entry as of one instant
    pub fn snapshot(&self) -> MapSnapshot<K, V>
    where
        K: Clone,
        V: Clone,
    {
        let entries = self.items();
        tracing::debug!(entries = entries.len(), "map snapshot taken");
        MapSnapshot::new(self.shard_count(), entries)
    }

    /// Independent live copy as of one instant
    pub fn copy(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self {
            shards: self.shards.duplicate(),
        }
    }
}

impl<K: HashKey, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: HashKey + Clone, V: Clone> Clone for ConcurrentMap<K, V> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<K: HashKey, V> std::fmt::Debug for ConcurrentMap<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentMap")
            .field("len", &self.len())
            .field("shards", &self.shard_count())
            .finish()
    }
}
