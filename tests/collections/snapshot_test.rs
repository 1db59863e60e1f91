/*!
 * Snapshot Tests
 */

use pretty_assertions::assert_eq;
use syncx::core::serialization::SNAPSHOT_FORMAT_VERSION;
use syncx::{ConcurrentMap, ConcurrentSet, MapSnapshot, SetSnapshot, SnapshotError, Value};

#[test]
fn test_snapshot_restore_isolation() {
    let source = ConcurrentMap::new();
    source.set("alpha".to_string(), 1).unwrap();
    source.set("beta".to_string(), 2).unwrap();

    let restored = source.snapshot().restore().unwrap();
    source.set("alpha".to_string(), 10).unwrap();
    restored.set("beta".to_string(), 20).unwrap();

    assert_eq!(source.get(&"beta".to_string()), Ok(2));
    assert_eq!(restored.get(&"alpha".to_string()), Ok(1));
}

#[test]
fn test_snapshot_is_frozen() {
    let map = ConcurrentMap::with_shards(4);
    map.set(1u8, 'a').unwrap();

    let snapshot = map.snapshot();
    map.set(2u8, 'b').unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot.entries(), &[(1u8, 'a')]);
    assert_eq!(snapshot.shard_count(), 4);
}

#[test]
fn test_value_map_blob_round_trip() {
    let map = ConcurrentMap::with_shards(8);
    map.set(
        Value::Tuple(vec![Value::from("k"), Value::Int(1)]),
        Value::List(vec![Value::Float(1.5), Value::None]),
    )
    .unwrap();
    map.set(Value::Bytes(vec![0, 1]), Value::Bool(true)).unwrap();

    let bytes = map.snapshot().to_bytes().unwrap();
    let decoded: MapSnapshot<Value, Value> = MapSnapshot::from_bytes(&bytes).unwrap();
    let restored = decoded.restore().unwrap();

    assert_eq!(restored.len(), 2);
    assert_eq!(
        restored.get(&Value::Bytes(vec![0, 1])),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_set_blob_round_trip() {
    let set = ConcurrentSet::with_shards(2);
    for word in ["x", "y", "z"] {
        set.add(word.to_string()).unwrap();
    }

    let bytes = set.snapshot().to_bytes().unwrap();
    let mut members = SetSnapshot::<String>::from_bytes(&bytes)
        .unwrap()
        .restore()
        .unwrap()
        .to_vec();
    members.sort();
    assert_eq!(members, vec!["x", "y", "z"]);
}

#[test]
fn test_corrupt_blobs_rejected() {
    let set = ConcurrentSet::new();
    set.add(1u64).unwrap();
    let bytes = set.snapshot().to_bytes().unwrap();

    let mut wrong_version = bytes.clone();
    wrong_version[0] = SNAPSHOT_FORMAT_VERSION.wrapping_add(1);
    assert!(matches!(
        SetSnapshot::<u64>::from_bytes(&wrong_version),
        Err(SnapshotError::InvalidVersion { .. })
    ));

    assert!(SetSnapshot::<u64>::from_bytes(&bytes[..2]).is_err());
    assert!(SetSnapshot::<u64>::from_bytes(&[]).is_err());
}
