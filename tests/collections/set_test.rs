/*!
 * Concurrent Set Tests
 */

use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use syncx::{ConcurrentSet, KeyError, Value};

#[test]
fn test_add_twice() {
    let set = ConcurrentSet::new();
    set.add("a").unwrap();
    set.add("a").unwrap();
    assert_eq!(set.len(), 1);
}

#[test]
fn test_discard_and_remove_missing() {
    let set: ConcurrentSet<&str> = ConcurrentSet::new();

    assert_eq!(set.discard(&"missing"), Ok(false));
    assert_eq!(set.remove(&"missing"), Err(KeyError::MissingKey));
}

#[test]
fn test_copy_isolation() {
    let source = ConcurrentSet::new();
    source.add(1).unwrap();
    source.add(2).unwrap();

    let clone = source.copy();
    clone.add(3).unwrap();
    assert_eq!(source.len(), 2);
    assert_eq!(source.contains(&3), Ok(false));

    source.clear();
    assert_eq!(clone.len(), 3);
    assert!(source.is_empty());
}

#[test]
fn test_unhashable_member_leaves_set_unchanged() {
    let set = ConcurrentSet::new();
    set.add(Value::Int(1)).unwrap();
    let bad = Value::Tuple(vec![Value::List(vec![])]);

    assert!(matches!(set.add(bad.clone()), Err(KeyError::UnhashableKey { .. })));
    assert!(matches!(set.remove(&bad), Err(KeyError::UnhashableKey { .. })));
    assert!(matches!(set.contains(&bad), Err(KeyError::UnhashableKey { .. })));
    assert_eq!(set.len(), 1);
}

#[test]
fn test_disjoint_insertion_from_four_threads() {
    let set = Arc::new(ConcurrentSet::new());

    let handles: Vec<_> = (0..4u32)
        .map(|t| {
            let set = set.clone();
            thread::spawn(move || {
                for i in 0..25u32 {
                    let member = t * 100 + i;
                    assert_eq!(set.add(member), Ok(true));
                    assert_eq!(set.contains(&member), Ok(true));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(set.len(), 100);
}
