#![no_main]

use std::collections::BTreeMap;

use avltree::AvlTree;
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum Action {
    Clear,
    Put(u8, u16),
    Replace(u8, u16),
    Get(u8),
    Remove(u8),
    Neighbours(u8),
    Iter { ascending: bool },
    Filter(u8),
    Copy,
}

fuzz_target!(|actions: Vec<Action>| {
    let mut tree = AvlTree::ordered();
    let mut model = BTreeMap::new();

    for action in actions {
        match action {
            Action::Clear => {
                tree.clear();
                model.clear();
            }
            Action::Put(key, value) => {
                tree.put(key, value);
                model.entry(key).or_insert(value);
            }
            Action::Replace(key, value) => {
                tree.replace(&key, value);
                if let Some(slot) = model.get_mut(&key) {
                    *slot = value;
                }
            }
            Action::Get(key) => {
                assert_eq!(tree.get(&key), model.get(&key));
                assert_eq!(tree.contains(&key), model.contains_key(&key));
            }
            Action::Remove(key) => {
                assert_eq!(tree.remove(&key), model.remove(&key));
            }
            Action::Neighbours(key) => {
                let (next, prev) = if model.contains_key(&key) {
                    (
                        model.range(key..).nth(1).map(|(_, v)| v),
                        model.range(..key).next_back().map(|(_, v)| v),
                    )
                } else {
                    (None, None)
                };
                assert_eq!(tree.next(&key), next);
                assert_eq!(tree.prev(&key), prev);
            }
            Action::Iter { ascending } => {
                let entries: Vec<_> = tree.iterate(ascending).collect();
                let expected: Vec<_> = if ascending {
                    model.iter().collect()
                } else {
                    model.iter().rev().collect()
                };
                assert_eq!(entries, expected);
            }
            Action::Filter(bound) => {
                let filtered = tree.filter(|k, _| *k < bound);
                filtered.assert_valid();
                assert_eq!(filtered.len(), model.range(..bound).count());
            }
            Action::Copy => {
                let copy = tree.copy();
                copy.assert_valid();
                assert!(copy.iter().eq(tree.iter()));
            }
        }

        tree.assert_valid();
        assert_eq!(tree.len(), model.len());
    }
});
