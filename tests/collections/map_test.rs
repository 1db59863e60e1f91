/*!
 * Concurrent Map Tests
 */

use pretty_assertions::assert_eq;
use std::sync::{Arc, Barrier};
use std::thread;
use syncx::{ConcurrentMap, KeyError, Value};

fn s(text: &str) -> String {
    text.to_string()
}

#[test]
fn test_basic_lifecycle() {
    let map = ConcurrentMap::new();

    map.set(s("a"), 1).unwrap();
    assert_eq!(map.get(&s("a")), Ok(1));

    map.delete(&s("a")).unwrap();
    assert_eq!(map.get(&s("a")), Err(KeyError::MissingKey));
}

#[test]
fn test_pop_default_does_not_mutate() {
    let map = ConcurrentMap::new();
    map.set(s("kept"), 1).unwrap();

    assert_eq!(map.pop_or(&s("x"), 99), Ok(99));
    assert_eq!(map.len(), 1);
    assert_eq!(map.contains(&s("x")), Ok(false));
}

#[test]
fn test_setdefault_twice() {
    let map = ConcurrentMap::new();

    assert_eq!(map.setdefault(s("k"), 1), Ok(1));
    assert_eq!(map.setdefault(s("k"), 1), Ok(1));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_setdefault_single_winner_under_contention() {
    let map = Arc::new(ConcurrentMap::with_shards(4));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8u32)
        .map(|t| {
            let map = map.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                map.setdefault(s("shared"), t).unwrap()
            })
        })
        .collect();

    let observed: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let winner = map.get(&s("shared")).unwrap();
    assert!(observed.iter().all(|&v| v == winner));
    assert_eq!(map.len(), 1);
}

#[test]
fn test_unhashable_key_on_every_operation() {
    let map: ConcurrentMap<Value, Value> = ConcurrentMap::new();
    map.set(Value::from("ok"), Value::Int(1)).unwrap();
    let bad = Value::List(vec![Value::Int(1), Value::Int(2)]);

    let unhashable = |result: Result<(), KeyError>| {
        assert!(matches!(result, Err(KeyError::UnhashableKey { .. })), "{result:?}");
    };

    unhashable(map.set(bad.clone(), Value::None).map(drop));
    unhashable(map.get(&bad).map(drop));
    unhashable(map.get_or(&bad, Value::None).map(drop));
    unhashable(map.delete(&bad));
    unhashable(map.pop(&bad).map(drop));
    unhashable(map.pop_or(&bad, Value::None).map(drop));
    unhashable(map.setdefault(bad.clone(), Value::None).map(drop));
    unhashable(map.contains(&bad).map(drop));
    unhashable(map.update(&bad, |_| ()).map(drop));

    assert_eq!(map.len(), 1);
    assert_eq!(map.get(&Value::from("ok")), Ok(Value::Int(1)));
}

#[test]
fn test_list_values_are_allowed() {
    let map = ConcurrentMap::new();
    let list = Value::List(vec![Value::Int(1)]);

    map.set(Value::Int(1), list.clone()).unwrap();
    assert_eq!(map.get(&Value::Int(1)), Ok(list));
}

#[test]
fn test_disjoint_insertion_from_four_threads() {
    let map = Arc::new(ConcurrentMap::new());

    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let map = map.clone();
            thread::spawn(move || {
                for i in 0..25u32 {
                    let key = t * 100 + i;
                    map.set(key, i).unwrap();
                    // Readable by the inserting thread right away
                    assert_eq!(map.get(&key), Ok(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(map.len(), 100);
}

#[test]
fn test_clear_races_with_writers() {
    let map = Arc::new(ConcurrentMap::with_shards(8));

    let writers: Vec<_> = (0..4u64)
        .map(|t| {
            let map = map.clone();
            thread::spawn(move || {
                for i in 0..1_000u64 {
                    map.set(t * 10_000 + i, i).unwrap();
                }
            })
        })
        .collect();

    for _ in 0..10 {
        map.clear();
        thread::yield_now();
    }

    for handle in writers {
        handle.join().unwrap();
    }
    // Counters agree with the contents once writers are done
    assert_eq!(map.len(), map.keys().len());
}
