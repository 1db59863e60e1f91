/*!
 * Model-Based Collection Tests
 *
 * Random operation sequences applied to both a sharded collection and a
 * std collection must produce identical observable results.
 */

use proptest::prelude::*;
use std::collections::{HashMap, HashSet};
use syncx::{ConcurrentMap, ConcurrentSet, KeyError};

#[derive(Debug, Clone)]
enum MapOp {
    Set(u8, u32),
    Get(u8),
    Delete(u8),
    PopOr(u8, u32),
    SetDefault(u8, u32),
    Clear,
}

fn map_op() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        4 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| MapOp::Set(k, v)),
        3 => any::<u8>().prop_map(MapOp::Get),
        2 => any::<u8>().prop_map(MapOp::Delete),
        2 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| MapOp::PopOr(k, v)),
        2 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| MapOp::SetDefault(k, v)),
        1 => Just(MapOp::Clear),
    ]
}

#[derive(Debug, Clone)]
enum SetOp {
    Add(u8),
    Discard(u8),
    Remove(u8),
    Contains(u8),
}

fn set_op() -> impl Strategy<Value = SetOp> {
    prop_oneof![
        any::<u8>().prop_map(SetOp::Add),
        any::<u8>().prop_map(SetOp::Discard),
        any::<u8>().prop_map(SetOp::Remove),
        any::<u8>().prop_map(SetOp::Contains),
    ]
}

proptest! {
    #[test]
    fn map_matches_hashmap(shards in 1usize..16, ops in prop::collection::vec(map_op(), 0..200)) {
        let map = ConcurrentMap::with_shards(shards);
        let mut model: HashMap<u8, u32> = HashMap::new();

        for op in ops {
            match op {
                MapOp::Set(k, v) => {
                    prop_assert_eq!(map.set(k, v).unwrap(), model.insert(k, v));
                }
                MapOp::Get(k) => {
                    let expected = model.get(&k).copied().ok_or(KeyError::MissingKey);
                    prop_assert_eq!(map.get(&k), expected);
                }
                MapOp::Delete(k) => {
                    let expected = model.remove(&k).map(drop).ok_or(KeyError::MissingKey);
                    prop_assert_eq!(map.delete(&k), expected);
                }
                MapOp::PopOr(k, default) => {
                    let expected = model.remove(&k).unwrap_or(default);
                    prop_assert_eq!(map.pop_or(&k, default).unwrap(), expected);
                }
                MapOp::SetDefault(k, v) => {
                    let expected = *model.entry(k).or_insert(v);
                    prop_assert_eq!(map.setdefault(k, v).unwrap(), expected);
                }
                MapOp::Clear => {
                    map.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(map.len(), model.len());
        }

        let mut items = map.items();
        items.sort_unstable();
        let mut expected: Vec<_> = model.into_iter().collect();
        expected.sort_unstable();
        prop_assert_eq!(items, expected);
    }

    #[test]
    fn set_matches_hashset(shards in 1usize..16, ops in prop::collection::vec(set_op(), 0..200)) {
        let set = ConcurrentSet::with_shards(shards);
        let mut model: HashSet<u8> = HashSet::new();

        for op in ops {
            match op {
                SetOp::Add(m) => prop_assert_eq!(set.add(m).unwrap(), model.insert(m)),
                SetOp::Discard(m) => prop_assert_eq!(set.discard(&m).unwrap(), model.remove(&m)),
                SetOp::Remove(m) => {
                    let expected = if model.remove(&m) { Ok(()) } else { Err(KeyError::MissingKey) };
                    prop_assert_eq!(set.remove(&m), expected);
                }
                SetOp::Contains(m) => prop_assert_eq!(set.contains(&m).unwrap(), model.contains(&m)),
            }
        }
        prop_assert_eq!(set.len(), model.len());
    }

    #[test]
    fn snapshot_restore_preserves_contents(entries in prop::collection::hash_map(any::<u16>(), any::<i64>(), 0..64)) {
        let map = ConcurrentMap::with_shards(8);
        for (k, v) in &entries {
            map.set(*k, *v).unwrap();
        }

        let blob = map.snapshot().to_bytes().unwrap();
        let restored = syncx::MapSnapshot::<u16, i64>::from_bytes(&blob).unwrap().restore().unwrap();

        prop_assert_eq!(restored.len(), entries.len());
        for (k, v) in &entries {
            prop_assert_eq!(restored.get(k), Ok(*v));
        }
    }
}
