use crate::AvlTree;
use alloc::sync::Arc;
use core::cmp::Ordering;

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns `true` if `pred` holds for at least one entry.
    ///
    /// Entries are visited in ascending order and the search stops at the first match. Always
    /// `false` for an empty tree.
    pub fn any<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.iter().any(|(key, value)| pred(key, value))
    }

    /// Returns `true` if `pred` holds for every entry.
    ///
    /// Entries are visited in ascending order and the search stops at the first mismatch. Always
    /// `true` for an empty tree.
    pub fn all<F>(&self, mut pred: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.iter().all(|(key, value)| pred(key, value))
    }
}

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Returns a new tree holding `f(key, value)` for every entry of this one.
    ///
    /// The new tree shares this tree's comparator and is built by inserting the transformed entries
    /// in ascending order, so its shape is independent of this tree's shape.
    pub fn map<W, F>(&self, mut f: F) -> AvlTree<K, W, C>
    where
        K: Clone,
        F: FnMut(&K, &V) -> W,
    {
        let mut tree = AvlTree::with_shared_comparator(Arc::clone(&self.cmp));
        for (key, value) in self {
            tree.put(key.clone(), f(key, value));
        }
        tree
    }

    /// Returns a new tree holding only the entries for which `pred` holds.
    ///
    /// The new tree shares this tree's comparator, this tree is left untouched.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        K: Clone,
        V: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let mut tree = Self::with_shared_comparator(Arc::clone(&self.cmp));
        for (key, value) in self {
            if pred(key, value) {
                tree.put(key.clone(), value.clone());
            }
        }
        tree
    }

    /// Returns a structurally independent deep copy of this tree sharing the same comparator.
    pub fn copy(&self) -> Self
    where
        K: Clone,
        V: Clone,
    {
        self.filter(|_, _| true)
    }
}

impl<K, V, C> Clone for AvlTree<K, V, C>
where
    K: Clone,
    V: Clone,
    C: Fn(&K, &K) -> Ordering,
{
    fn clone(&self) -> Self {
        self.copy()
    }
}
