#![allow(unused, reason = "not used by all tests")]

use avltree::AvlTree;

/// Builds a tree from keys `1..=n` inserted in increasing order, each mapped to its decimal string.
pub fn numbered(n: i32) -> AvlTree<i32, String> {
    let mut tree = AvlTree::ordered();
    for i in 1..=n {
        tree.put(i, i.to_string());
    }
    tree
}

pub fn keys<K: Copy, V, C>(tree: &AvlTree<K, V, C>, ascending: bool) -> Vec<K> {
    tree.iterate(ascending).map(|(k, _)| *k).collect()
}
