/*!
 * Shard Storage
 *
 * Partitioned storage shared by `ConcurrentMap` and `ConcurrentSet`. Each
 * shard is a bucket table behind its own `Mutex`, plus an entry counter that
 * is only written with that shard's lock held.
 *
 * # Lock order
 *
 * Single-key operations lock exactly one shard. Whole-collection operations
 * lock every shard in ascending index order and release in reverse, so two
 * of them can never deadlock against each other.
 */

use super::key::HashKey;
use crate::core::errors::KeyError;
use crate::locks::{Mutex, MutexGuard};
use ahash::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Entries of one shard, bucketed by their precomputed hash
///
/// Buckets are scanned by `Eq`, so keys only need `HashKey`, not `Hash`.
#[derive(Clone)]
pub(crate) struct ShardTable<K, V> {
    buckets: HashMap<u64, Vec<(K, V)>, RandomState>,
    len: usize,
}

impl<K: HashKey, V> ShardTable<K, V> {
    fn new() -> Self {
        Self {
            buckets: HashMap::with_hasher(RandomState::new()),
            len: 0,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn get(&self, hash: u64, key: &K) -> Option<&V> {
        self.buckets
            .get(&hash)?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    pub(crate) fn get_mut(&mut self, hash: u64, key: &K) -> Option<&mut V> {
        self.buckets
            .get_mut(&hash)?
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// Insert or overwrite, returning the previous value
    pub(crate) fn insert(&mut self, hash: u64, key: K, value: V) -> Option<V> {
        let bucket = self.buckets.entry(hash).or_default();
        if let Some(slot) = bucket.iter_mut().find(|(k, _)| *k == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        bucket.push((key, value));
        self.len += 1;
        None
    }

    pub(crate) fn remove(&mut self, hash: u64, key: &K) -> Option<V> {
        let bucket = self.buckets.get_mut(&hash)?;
        let index = bucket.iter().position(|(k, _)| k == key)?;
        let (_, value) = bucket.swap_remove(index);
        if bucket.is_empty() {
            self.buckets.remove(&hash);
        }
        self.len -= 1;
        Some(value)
    }

    /// Value for `key`, inserting `make()` first if absent
    pub(crate) fn get_or_insert_with(
        &mut self,
        hash: u64,
        key: K,
        make: impl FnOnce() -> V,
    ) -> &mut V {
        let bucket = self.buckets.entry(hash).or_default();
        let index = match bucket.iter().position(|(k, _)| *k == key) {
            Some(index) => index,
            None => {
                bucket.push((key, make()));
                self.len += 1;
                bucket.len() - 1
            }
        };
        &mut bucket[index].1
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.iter().map(|(k, v)| (k, v)))
    }
}

/// One lock-protected partition
pub(crate) struct Shard<K, V> {
    table: Mutex<ShardTable<K, V>>,
    len: AtomicUsize,
}

impl<K: HashKey, V> Shard<K, V> {
    fn new() -> Self {
        Self {
            table: Mutex::new(ShardTable::new()),
            len: AtomicUsize::new(0),
        }
    }
}

/// Fixed set of shards plus the per-collection hash seed
pub(crate) struct Shards<K, V> {
    shards: Box<[Shard<K, V>]>,
    hasher: RandomState,
}

impl<K: HashKey, V> Shards<K, V> {
    /// Panics if `count` is zero
    pub(crate) fn new(count: usize) -> Self {
        assert!(count > 0, "shard count must be at least 1");
        Self {
            shards: (0..count).map(|_| Shard::new()).collect(),
            hasher: RandomState::new(),
        }
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.shards.len()
    }

    /// Hash `key` with this collection's seed
    ///
    /// Runs before any shard lock is taken, so an unhashable key never
    /// touches shared state.
    #[inline]
    pub(crate) fn hash(&self, key: &K) -> Result<u64, KeyError> {
        let mut hasher = self.hasher.build_hasher();
        key.try_hash(&mut hasher)?;
        Ok(std::hash::Hasher::finish(&hasher))
    }

    /// Run `f` on the shard owning `hash`, with that shard locked
    pub(crate) fn with_shard<R>(&self, hash: u64, f: impl FnOnce(&mut ShardTable<K, V>) -> R) -> R {
        let shard = &self.shards[(hash % self.shards.len() as u64) as usize];
        let mut table = shard.table.acquire();
        let result = f(&mut table);
        shard.len.store(table.len(), Ordering::Relaxed);
        result
    }

    /// Sum of per-shard counters, without locking
    ///
    /// Exact when no mutation is in flight.
    pub(crate) fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.len.load(Ordering::Relaxed))
            .sum()
    }

    /// Independent copy of every shard, taken with all shards locked
    ///
    /// The copy keeps this collection's hash seed, so stored hashes stay valid.
    pub(crate) fn duplicate(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let all = self.lock_all();
        let shards = all
            .held
            .iter()
            .map(|(_, table)| Shard {
                len: AtomicUsize::new(table.len()),
                table: Mutex::new(ShardTable::clone(table)),
            })
            .collect();
        drop(all);

        Self {
            shards,
            hasher: self.hasher.clone(),
        }
    }

    /// Lock every shard in ascending order
    pub(crate) fn lock_all(&self) -> AllShards<'_, K, V> {
        let mut held = Vec::with_capacity(self.shards.len());
        for shard in self.shards.iter() {
            held.push((shard, shard.table.acquire()));
        }
        AllShards { held }
    }
}

/// Every shard of one collection, locked; releases in reverse order on drop
pub(crate) struct AllShards<'a, K, V> {
    held: Vec<(&'a Shard<K, V>, MutexGuard<'a, ShardTable<K, V>>)>,
}

impl<K: HashKey, V> AllShards<'_, K, V> {
    pub(crate) fn len(&self) -> usize {
        self.held.iter().map(|(_, table)| table.len()).sum()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.held.iter().flat_map(|(_, table)| table.iter())
    }

    pub(crate) fn clear(&mut self) {
        for (_, table) in self.held.iter_mut() {
            table.clear();
        }
    }
}

impl<K, V> Drop for AllShards<'_, K, V> {
    fn drop(&mut self) {
        while let Some((shard, table)) = self.held.pop() {
            shard.len.store(table.len, Ordering::Relaxed);
            drop(table);
        }
    }
}
