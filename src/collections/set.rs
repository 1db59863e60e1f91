/*!
 * Concurrent Set
 *
 * Presence-only counterpart of `ConcurrentMap`: same shards, same hashing
 * rules, same all-shard lock order for `clear`, `copy` and `snapshot`.
 */

use super::key::HashKey;
use super::shard::Shards;
use super::snapshot::SetSnapshot;
use crate::core::errors::KeyError;
use crate::core::shard_manager::{ShardManager, WorkloadProfile};

/// Thread-safe set over `HashKey` members
pub struct ConcurrentSet<T> {
    shards: Shards<T, ()>,
}

impl<T: HashKey> ConcurrentSet<T> {
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

    pub fn with_profile(profile: WorkloadProfile) -> Self {
        Self::with_shards(ShardManager::shards(profile))
    }

    /// Build from members; duplicates collapse
    pub fn from_members(members: impl IntoIterator<Item = T>) -> Result<Self, KeyError> {
        let set = Self::new();
        for member in members {
            set.add(member)?;
        }
        Ok(set)
    }

    pub fn shard_count(&self) -> usize {
        self.shards.count()
    }

    /// Insert `item`; `true` if it was not already present
    pub fn add(&self, item: T) -> Result<bool, KeyError> {
        let hash = self.shards.hash(&item)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.insert(hash, item, ()).is_none()))
    }

    /// Remove `item` if present; `true` if it was
    pub fn discard(&self, item: &T) -> Result<bool, KeyError> {
        let hash = self.shards.hash(item)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.remove(hash, item).is_some()))
    }

    /// Remove `item`; `MissingKey` if absent
    pub fn remove(&self, item: &T) -> Result<(), KeyError> {
        if self.discard(item)? {
            Ok(())
        } else {
            Err(KeyError::MissingKey)
        }
    }

    pub fn contains(&self, item: &T) -> Result<bool, KeyError> {
        let hash = self.shards.hash(item)?;
        Ok(self
            .shards
            .with_shard(hash, |table| table.get(hash, item).is_some()))
    }

    pub fn len(&self) -> usize {
        self.shards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut all = self.shards.lock_all();
        let removed = all.len();
        all.clear();
        drop(all);
        tracing::debug!(removed, shards = self.shard_count(), "set cleared");
    }

    /// Members as of one instant
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.shards
            .lock_all()
            .iter()
            .map(|(item, _)| item.clone())
            .collect()
    }

    /// Independent live copy as of one instant
    pub fn copy(&self) -> Self
    where
        T: Clone,
    {
        Self {
            shards: self.shards.duplicate(),
        }
    }

    /// Frozen copy of every member as of one instant
    pub fn snapshot(&self) -> SetSnapshot<T>
    where
        T: Clone,
    {
        let members = self.to_vec();
        tracing::debug!(members = members.len(), "set snapshot taken");
        SetSnapshot::new(self.shard_count(), members)
    }
}

impl<T: HashKey> Default for ConcurrentSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: HashKey + Clone> Clone for ConcurrentSet<T> {
    fn clone(&self) -> Self {
        self.copy()
    }
}

impl<T: HashKey> std::fmt::Debug for ConcurrentSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentSet")
            .field("len", &self.len())
            .field("shards", &self.shard_count())
            .finish()
    }
}
