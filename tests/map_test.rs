/*!
 * Synchronized Map Tests
 * Lookup/mutation contracts and two-instance operations
 */

use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use threadsafe_containers::{ContainerConfig, ContainerError, SyncMap};

fn inventory() -> SyncMap<String, u32> {
    let map = SyncMap::with_config(ContainerConfig::with_capacity(16).label("inventory"));
    map.insert("apples".to_string(), 3);
    map.insert("pears".to_string(), 5);
    map
}

#[test]
fn test_find_absence_is_a_sentinel() {
    let map = inventory();
    assert_eq!(map.get("plums"), None);
    assert!(!map.contains_key("plums"));
    assert_eq!(map.count("plums"), 0);
}

#[test]
fn test_at_fails_with_key_not_found() {
    let map = inventory();
    assert_eq!(map.at("apples"), Ok(3));
    assert!(matches!(map.at("plums"), Err(ContainerError::KeyNotFound(_))));
}

#[test]
fn test_indexing_mutates_under_exclusive_lock() {
    let map = inventory();
    map.with_entry("plums".to_string(), |v| *v += 2);
    map.with_entry("apples".to_string(), |v| *v *= 10);

    assert_eq!(map.get("plums"), Some(2));
    assert_eq!(map.get("apples"), Some(30));
    assert_eq!(map.len(), 3);
}

#[test]
fn test_merge_raw_container() {
    let map = inventory();
    let mut incoming = HashMap::new();
    incoming.insert("pears".to_string(), 100);
    incoming.insert("figs".to_string(), 1);

    let moved = map.merge(&mut incoming);

    assert_eq!(moved, 1);
    assert_eq!(map.get("pears"), Some(5));
    assert_eq!(map.get("figs"), Some(1));
    assert_eq!(incoming.into_iter().collect::<Vec<_>>(), vec![("pears".to_string(), 100)]);
}

#[test]
fn test_copy_construction_is_a_snapshot() {
    let map = inventory();
    let copy = map.clone();
    map.insert("kiwis".to_string(), 7);

    assert_eq!(copy.len(), 2);
    assert_eq!(copy.label(), "inventory");
    assert_eq!(map.len(), 3);
}

#[test]
fn test_move_construction_empties_source() {
    let map = inventory();
    let moved = SyncMap::take(&map);

    assert!(map.is_empty());
    assert_eq!(moved.get("pears"), Some(5));
}

#[test]
fn test_self_operations_are_no_ops() {
    let map = inventory();
    map.assign_from(&map);
    map.take_from(&map);
    map.swap(&map);
    assert_eq!(map.merge_from(&map), 0);
    assert_eq!(map.len(), 2);
}

#[test]
fn test_concurrent_inserts_keep_keys_unique() {
    let map: Arc<SyncMap<u32, u32>> = Arc::new(SyncMap::new());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let map = map.clone();
            thread::spawn(move || {
                let mut wins = 0;
                for key in 0..1_000 {
                    if map.insert(key, t) {
                        wins += 1;
                    }
                }
                wins
            })
        })
        .collect();

    let wins: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(wins, 1_000);
    assert_eq!(map.len(), 1_000);
}

#[test]
fn test_concurrent_counters_via_indexing() {
    let map: Arc<SyncMap<&'static str, u64>> = Arc::new(SyncMap::new());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let map = map.clone();
            thread::spawn(move || {
                for _ in 0..2_500 {
                    map.with_entry("hits", |v| *v += 1);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(map.get("hits"), Some(10_000));
}
