//! # An AVL tree ordered map.
//!
//! [`AvlTree`] is an ordered, mutable key-value container backed by a self-balancing binary search
//! tree as described by [Adelson-Velsky & Landis (1962)][avl]. Every node stores the height of its
//! subtree and the tree restores the AVL rule (sibling subtree heights differ by at most one) after
//! each insertion or removal, which bounds the height to ~1.44log2(n).
//!
//! Unlike `BTreeMap`, keys are ordered by a *comparator* supplied when the tree is constructed
//! rather than by the key type's [`Ord`] implementation. The same key type can therefore be ordered
//! differently by different trees:
//!
//! ```rust
//! use avltree::AvlTree;
//!
//! let mut tree = AvlTree::new(|a: &u32, b: &u32| b.cmp(a));
//! tree.put(1, "one");
//! tree.put(2, "two");
//! tree.put(3, "three");
//!
//! let keys: Vec<_> = tree.iterate(true).map(|(k, _)| *k).collect();
//! assert_eq!(keys, [3, 2, 1]);
//! assert_eq!(tree.next(&2), Some(&"one"));
//! ```
//!
//! ## when to use this
//!
//! - **want ordered neighbours** - [`AvlTree::next`] and [`AvlTree::prev`] return the value
//!   following or preceding a given key in logarithmic time.
//! - **need a custom order** - the comparator is a plain closure, no newtype wrappers required.
//! - **search more than you edit** - AVL trees are more strictly balanced than red-black trees,
//!   making lookups slightly cheaper at the cost of more rebalancing work on mutation.
//!
//! ## semantics
//!
//! - [`AvlTree::put`] never overwrites: inserting a key that is already present leaves the stored
//!   value untouched. Use [`AvlTree::replace`] to update the value of an existing key.
//! - [`AvlTree::replace`] never inserts.
//! - Lookups, neighbour queries and removals of missing keys return `None`.
//!
//! ## features
//!
//! The following features are available:
//!
//! | Feature | Default | Explanation                                                                             |
//! |:--------|:--------|:----------------------------------------------------------------------------------------|
//! | `dot`   | `false` | Enables the `AvlTree::dot` method, which allows display of the tree in [graphviz format] |
//!
//! [avl]: https://en.wikipedia.org/wiki/AVL_tree
//! [graphviz format]: https://graphviz.org/doc/info/lang.html

#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod combinators;
#[cfg(feature = "dot")]
mod dot;
mod iter;
mod node;
mod pretty;

use crate::node::{Link, Node, Side};
use alloc::boxed::Box;
use alloc::sync::Arc;
use core::cmp::Ordering;
use core::marker::PhantomData;
use core::ptr::NonNull;

#[cfg(feature = "dot")]
pub use dot::Dot;
pub use iter::Iter;

/// Error type returned by [`AvlTree::try_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No comparator was supplied, the tree would have no way to order its keys.
    MissingComparator,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MissingComparator => write!(f, "an AVL tree requires a comparator"),
        }
    }
}

impl core::error::Error for Error {}

/// An ordered map backed by an AVL tree.
///
/// Keys are ordered by the comparator `C`, a three-way comparison returning [`Ordering`]. The
/// comparator must implement a total order and must stay consistent for the lifetime of the tree;
/// the tree's behaviour is unspecified (but memory safe) otherwise.
///
/// Trees derived from this one through [`map`](AvlTree::map), [`filter`](AvlTree::filter) or
/// [`copy`](AvlTree::copy) share the same comparator instance.
///
/// All point operations complete in O(log n) time.
pub struct AvlTree<K, V, C = fn(&K, &K) -> Ordering> {
    root: Link<K, V>,
    len: usize,
    cmp: Arc<C>,
    _marker: PhantomData<Box<Node<K, V>>>,
}

// Safety: the tree exclusively owns all of its nodes, so sending it sends the keys, values and
// the shared comparator along with it.
unsafe impl<K: Send, V: Send, C: Send + Sync> Send for AvlTree<K, V, C> {}
// Safety: shared access to the tree only ever hands out shared references to keys and values.
unsafe impl<K: Sync, V: Sync, C: Send + Sync> Sync for AvlTree<K, V, C> {}

impl<K, V, C> Drop for AvlTree<K, V, C> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K: Ord, V> AvlTree<K, V> {
    /// Creates a new, empty tree ordered by the key type's [`Ord`] implementation.
    #[must_use]
    pub fn ordered() -> Self {
        Self::new(K::cmp)
    }
}

impl<K: Ord, V> Default for AvlTree<K, V> {
    fn default() -> Self {
        Self::ordered()
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns the number of entries in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the tree contains no entries.
    pub fn is_empty(&self) -> bool {
        debug_assert_eq!(self.root.is_none(), self.len == 0);
        self.len == 0
    }

    /// Returns a lazy iterator over the entries of the tree.
    ///
    /// With `ascending` set, entries are yielded smallest key first, otherwise largest key first.
    /// Each call starts a fresh traversal.
    pub fn iterate(&self, ascending: bool) -> Iter<'_, K, V> {
        Iter {
            // Safety: the root and all its descendants are live nodes owned by this tree
            head: self.root.map(|root| unsafe { node::find_minimum(root) }),
            // Safety: see above
            tail: self.root.map(|root| unsafe { node::find_maximum(root) }),
            remaining: self.len,
            ascending,
            _tree: PhantomData,
        }
    }

    /// Gets an iterator over the entries of the tree, sorted by their key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        self.iterate(true)
    }

    /// Returns the entry with the smallest key.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Returns the entry with the largest key.
    pub fn last(&self) -> Option<(&K, &V)> {
        self.iterate(false).next()
    }

    /// Returns a renderer displaying the tree in graphviz format.
    #[cfg(feature = "dot")]
    pub fn dot(&self) -> Dot<'_, K, V, C> {
        Dot { tree: self }
    }

    /// Removes all entries from the tree.
    pub fn clear(&mut self) {
        if let Some(root) = self.root.take() {
            // Safety: we just detached the root, nothing else references these nodes anymore
            unsafe { Self::free_subtree(root) };
        }
        self.len = 0;
    }

    unsafe fn free_subtree(node: NonNull<Node<K, V>>) {
        // Safety: ensured by caller
        let node = unsafe { Node::free(node) };
        if let Some(left) = node.left {
            // Safety: a detached subtree is exclusively owned by its root
            unsafe { Self::free_subtree(left) };
        }
        if let Some(right) = node.right {
            // Safety: see above
            unsafe { Self::free_subtree(right) };
        }
    }
}

impl<K, V, C> AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    /// Creates a new, empty tree ordering its keys by `cmp`.
    #[must_use]
    pub fn new(cmp: C) -> Self {
        Self::with_shared_comparator(Arc::new(cmp))
    }

    /// Creates a new, empty tree from an optional comparator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingComparator`] when `cmp` is `None`.
    pub fn try_new(cmp: Option<C>) -> Result<Self, Error> {
        cmp.map(Self::new).ok_or(Error::MissingComparator)
    }

    pub(crate) fn with_shared_comparator(cmp: Arc<C>) -> Self {
        Self {
            root: None,
            len: 0,
            cmp,
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the tree contains an entry for `key`.
    pub fn contains(&self, key: &K) -> bool {
        self.find_internal(key).is_some()
    }

    /// Returns a reference to the value stored for `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        let node = self.find_internal(key)?;
        // Safety: found nodes are live and borrowed for as long as `self` is
        Some(unsafe { &node.as_ref().value })
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let mut node = self.find_internal(key)?;
        // Safety: found nodes are live and we hold the tree exclusively
        Some(unsafe { &mut node.as_mut().value })
    }

    /// Returns the value of the entry that follows `key` in the tree's order.
    ///
    /// Returns `None` if `key` is not part of the tree or is the largest key.
    pub fn next(&self, key: &K) -> Option<&V> {
        let node = self.find_internal(key)?;
        // Safety: found nodes are live and linked consistently
        unsafe { node::next(node).map(|next| &next.as_ref().value) }
    }

    /// Returns the value of the entry that precedes `key` in the tree's order.
    ///
    /// Returns `None` if `key` is not part of the tree or is the smallest key.
    pub fn prev(&self, key: &K) -> Option<&V> {
        let node = self.find_internal(key)?;
        // Safety: found nodes are live and linked consistently
        unsafe { node::prev(node).map(|prev| &prev.as_ref().value) }
    }

    /// Inserts a new entry into the tree.
    ///
    /// If the tree already contains `key` this is a no-op, the stored value is **not** overwritten.
    /// See [`AvlTree::replace`] for updating existing entries.
    pub fn put(&mut self, key: K, value: V) {
        let mut parent = None;
        let mut side = Side::Left;
        let mut curr = self.root;

        while let Some(node) = curr {
            // Safety: all links reachable from the root point to live nodes
            let node_ref = unsafe { node.as_ref() };

            side = match (self.cmp)(&key, &node_ref.key) {
                Ordering::Equal => {
                    tracing::trace!("key already present, leaving entry untouched");
                    return;
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            parent = Some(node);
            curr = node_ref.child(side);
        }

        let node = Node::alloc(key, value, parent);
        // Safety: `parent` is a live node whose `side` child slot we just found empty
        unsafe { self.replace_child(parent, None, Some(node), side) };
        self.len += 1;

        self.balance_after_insert(parent);
    }

    /// Overwrites the value stored for `key`.
    ///
    /// If the tree does not contain `key` this is a no-op, no new entry is inserted.
    pub fn replace(&mut self, key: &K, value: V) {
        if let Some(mut node) = self.find_internal(key) {
            // Safety: found nodes are live and we hold the tree exclusively
            unsafe { node.as_mut().value = value };
        }
    }

    /// Removes the entry for `key` from the tree, returning its value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let node = self.find_internal(key)?;

        // Safety: `node` is a live node of this tree
        let walk_from = unsafe { self.unlink(node) };
        self.len -= 1;
        self.balance_after_remove(walk_from);

        // Safety: `node` has been unlinked, nothing else references it
        let node = unsafe { Node::free(node) };
        Some(node.value)
    }

    /// Asserts all of the tree's invariants.
    ///
    /// This checks the ordering of keys, parent links, the stored heights, the AVL balance rule and
    /// the entry count. It walks the entire tree and is meant for tests and debugging.
    ///
    /// # Panics
    ///
    /// Panics if any invariant is violated.
    #[track_caller]
    pub fn assert_valid(&self) {
        let Some(root) = self.root else {
            assert_eq!(self.len, 0, "empty tree must have a length of 0");
            return;
        };

        // Safety: the root and all its descendants are live nodes owned by this tree
        unsafe {
            assert!(
                root.as_ref().parent.is_none(),
                "root node cannot have a parent"
            );

            let mut count = 0;
            Self::assert_valid_inner(root, &mut count);
            assert_eq!(
                count, self.len,
                "length mismatch: {count} reachable nodes but length is {}",
                self.len
            );
        }

        let mut iter = self.iter();
        let mut visited = 0;
        if let Some((mut prev, _)) = iter.next() {
            visited += 1;
            for (key, _) in iter {
                assert_eq!(
                    (self.cmp)(prev, key),
                    Ordering::Less,
                    "Ordering violation: keys are not strictly increasing in order"
                );
                prev = key;
                visited += 1;
            }
        }
        assert_eq!(visited, self.len, "in-order walk must visit every entry");
    }

    #[track_caller]
    unsafe fn assert_valid_inner(node: NonNull<Node<K, V>>, count: &mut usize) -> u32 {
        *count += 1;

        // Safety: ensured by caller
        let node_ref = unsafe { node.as_ref() };
        let mut child_height = |side: Side| -> u32 {
            let Some(child) = node_ref.child(side) else {
                return 0;
            };

            assert_ne!(child, node, "node's {side} child cannot be itself");
            // Safety: children of a live node are live
            let parent = unsafe { child.as_ref().parent };
            assert_eq!(
                parent,
                Some(node),
                "node's {side} child does not point back to it"
            );
            // Safety: see above
            unsafe { Self::assert_valid_inner(child, count) }
        };

        let lh = child_height(Side::Left);
        let rh = child_height(Side::Right);

        assert_eq!(
            node_ref.height,
            1 + lh.max(rh),
            "height violation: stored height does not match subtree heights ({lh}, {rh})"
        );
        assert!(
            lh.abs_diff(rh) <= 1,
            "AVL balance violation: subtree heights {lh} and {rh} differ by more than 1"
        );

        node_ref.height
    }

    fn find_internal(&self, key: &K) -> Link<K, V> {
        let mut curr = self.root;
        while let Some(node) = curr {
            // Safety: all links reachable from the root point to live nodes
            let node_ref = unsafe { node.as_ref() };

            match (self.cmp)(key, &node_ref.key) {
                Ordering::Equal => return Some(node),
                Ordering::Less => curr = node_ref.left,
                Ordering::Greater => curr = node_ref.right,
            }
        }

        None
    }

    /// Retraces the path from a freshly inserted leaf's parent to the root.
    ///
    /// Heights can only grow by one during insertion, so the walk stops as soon as an ancestor's
    /// height is unaffected.
    fn balance_after_insert(&mut self, mut curr: Link<K, V>) {
        while let Some(mut node) = curr {
            // Safety: `curr` is always a live node of this tree
            unsafe {
                let node_ref = node.as_mut();
                let height = node_ref.computed_height();
                if height == node_ref.height {
                    break;
                }
                node_ref.height = height;

                let top = if node_ref.balance_factor().abs() > 1 {
                    self.rebalance(node)
                } else {
                    node
                };
                curr = top.as_ref().parent;
            }
        }
    }

    /// Retraces the path from the lowest structurally modified node to the root.
    ///
    /// A removal may leave a node out of balance without changing its height, so the walk only
    /// stops once a node's height is unaffected *and* it is still balanced.
    fn balance_after_remove(&mut self, mut curr: Link<K, V>) {
        while let Some(mut node) = curr {
            // Safety: `curr` is always a live node of this tree
            unsafe {
                let node_ref = node.as_mut();
                let height = node_ref.computed_height();
                let balance = node_ref.balance_factor();
                if height == node_ref.height && (-1..=1).contains(&balance) {
                    break;
                }
                node_ref.height = height;

                let top = if balance.abs() > 1 {
                    self.rebalance(node)
                } else {
                    node
                };
                curr = top.as_ref().parent;
            }
        }
    }

    /// Restores the AVL rule at `node` whose subtree heights differ by 2, returning the new root of
    /// the subtree.
    unsafe fn rebalance(&mut self, node: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
        // Safety: ensured by caller
        let node_ref = unsafe { node.as_ref() };
        let balance = node_ref.balance_factor();

        // the heavy side is the one we rotate away from
        let (heavy_side, light_side) = if balance < 0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        };

        let Some(heavy) = node_ref.child(heavy_side) else {
            debug_assert!(false, "unbalanced node must have a child on its heavy side");
            return node;
        };

        // Safety: children of a live node are live
        let heavy_balance = unsafe { heavy.as_ref().balance_factor() };
        let zig_zag = match heavy_side {
            Side::Right => heavy_balance > 0,
            Side::Left => heavy_balance < 0,
        };

        tracing::trace!(balance, heavy_balance, zig_zag, "rebalancing subtree");

        // Safety: `heavy` and `node` are live and linked to each other
        unsafe {
            if zig_zag {
                self.rotate(heavy, heavy_side);
            }
            self.rotate(node, light_side)
        }
    }

    /// Rotates the subtree rooted at `x` towards `side`, moving `x` down into its `side` child slot
    /// and promoting its opposite child. Returns the new root of the subtree.
    ///
    /// A rotation towards [`Side::Left`] is a left rotation, [`Side::Right`] a right rotation.
    unsafe fn rotate(&mut self, mut x: NonNull<Node<K, V>>, side: Side) -> NonNull<Node<K, V>> {
        tracing::trace!(%side, "rotating");

        // Safety: ensured by caller
        let x_ref = unsafe { x.as_mut() };
        let Some(mut y) = x_ref.child(side.opposite()) else {
            debug_assert!(false, "cannot rotate {side} without an opposite child");
            return x;
        };
        // Safety: children of a live node are live, `y` is a different node than `x`
        let y_ref = unsafe { y.as_mut() };

        // Y's inner subtree moves across to X
        let inner = y_ref.child(side);
        x_ref.set_child(side.opposite(), inner);
        if let Some(mut inner) = inner {
            // Safety: see above
            unsafe { inner.as_mut().parent = Some(x) };
        }

        // Y takes X's place below X's parent
        let parent = x_ref.parent;
        y_ref.parent = parent;
        // Safety: `parent` is a live node that links to `x`
        unsafe { self.replace_child(parent, Some(x), Some(y), side) };

        // X becomes Y's `side` child
        y_ref.set_child(side, Some(x));
        x_ref.parent = Some(y);

        // X is now below Y, so update bottom-up
        x_ref.update_height();
        y_ref.update_height();

        y
    }

    /// Detaches `node` from the tree, returning the node at which rebalancing has to start.
    unsafe fn unlink(&mut self, node: NonNull<Node<K, V>>) -> Link<K, V> {
        // Safety: ensured by caller
        let (parent, left, right, height) = unsafe {
            let node_ref = node.as_ref();
            (
                node_ref.parent,
                node_ref.left,
                node_ref.right,
                node_ref.height,
            )
        };

        let (Some(mut left), Some(mut right)) = (left, right) else {
            // Zero or one child: splice the child (if any) directly into our parent.
            let child = left.or(right);
            if let Some(mut child) = child {
                // Safety: children of a live node are live
                unsafe { child.as_mut().parent = parent };
            }
            // Safety: `parent` is a live node that links to `node`
            unsafe { self.replace_child(parent, Some(node), child, Side::Left) };
            return parent;
        };

        // Two children: promote the in-order successor into our position.
        // Safety: all descendants of a live node are live
        unsafe {
            let mut successor = node::find_minimum(right);
            let succ_ref = successor.as_mut();
            let succ_parent = succ_ref.parent;

            let walk_from = if succ_parent == Some(node) {
                // The successor is our direct right child and keeps its right subtree.
                Some(successor)
            } else {
                // Detach the successor, its right child takes its place as the left child of its
                // former parent.
                if let Some(mut p) = succ_parent {
                    p.as_mut().left = succ_ref.right;
                }
                if let Some(mut r) = succ_ref.right {
                    r.as_mut().parent = succ_parent;
                }

                succ_ref.right = Some(right);
                right.as_mut().parent = Some(successor);
                succ_parent
            };

            succ_ref.left = Some(left);
            left.as_mut().parent = Some(successor);

            succ_ref.parent = parent;
            succ_ref.height = height;
            self.replace_child(parent, Some(node), Some(successor), Side::Left);

            walk_from
        }
    }

    /// Points the slot of `parent` that currently holds `old` (or the root slot if `parent` is
    /// `None`) at `new`. When `old` is `None` the empty `side` slot is filled instead.
    unsafe fn replace_child(
        &mut self,
        parent: Link<K, V>,
        old: Link<K, V>,
        new: Link<K, V>,
        side: Side,
    ) {
        let Some(mut parent) = parent else {
            self.root = new;
            return;
        };

        // Safety: ensured by caller
        let parent_ref = unsafe { parent.as_mut() };
        match old {
            Some(_) if parent_ref.left == old => parent_ref.left = new,
            Some(_) => {
                debug_assert_eq!(parent_ref.right, old);
                parent_ref.right = new;
            }
            None => parent_ref.set_child(side, new),
        }
    }
}

impl<K, V, C> Extend<(K, V)> for AvlTree<K, V, C>
where
    C: Fn(&K, &K) -> Ordering,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.put(key, value);
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for AvlTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::ordered();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;

    use super::*;
    use alloc::format;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use rand::seq::SliceRandom;

    fn seven() -> AvlTree<i32, String> {
        let mut tree = AvlTree::ordered();
        for i in 1..=7 {
            tree.put(i, i.to_string());
        }
        tree
    }

    /// Key and height of the node reached by following `path` down from the root.
    fn node_at<V, C>(tree: &AvlTree<i32, V, C>, path: &[Side]) -> Option<(i32, u32)> {
        let mut curr = tree.root?;
        for side in path {
            // Safety: the tree is borrowed, so all its nodes are live
            curr = unsafe { curr.as_ref() }.child(*side)?;
        }
        // Safety: the tree is borrowed, so all its nodes are live
        let node = unsafe { curr.as_ref() };
        Some((node.key, node.height))
    }

    fn build(keys: &[i32]) -> AvlTree<i32, ()> {
        let mut tree = AvlTree::ordered();
        for key in keys {
            tree.put(*key, ());
        }
        tree.assert_valid();
        tree
    }

    #[test]
    fn put_and_get() {
        let mut tree: AvlTree<i32, String> = AvlTree::ordered();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);

        for i in 1..=7 {
            tree.put(i, format!("{i}"));
            tree.assert_valid();
        }

        assert!(!tree.is_empty());
        assert_eq!(tree.len(), 7);
        for i in 1..=7 {
            assert_eq!(tree.get(&i), Some(&format!("{i}")));
            assert!(tree.contains(&i));
        }
        assert_eq!(tree.get(&8), None);
        assert!(!tree.contains(&0));
    }

    #[test]
    fn put_does_not_overwrite() {
        let mut tree = AvlTree::ordered();
        tree.put(1, "a");
        tree.put(1, "b");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"a"));

        tree.replace(&1, "b");
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get(&1), Some(&"b"));
    }

    #[test]
    fn replace_does_not_insert() {
        let mut tree = seven();
        tree.replace(&8, "8".to_string());
        assert_eq!(tree.len(), 7);
        assert!(!tree.contains(&8));

        for i in 1..=7 {
            tree.replace(&i, format!("-{i}"));
        }
        for i in 1..=7 {
            assert_eq!(tree.get(&i), Some(&format!("-{i}")));
        }
        tree.assert_valid();
    }

    #[test]
    fn get_mut_updates_in_place() {
        let mut tree = seven();
        tree.get_mut(&3).unwrap().push('!');
        assert_eq!(tree.get(&3).map(String::as_str), Some("3!"));
        assert!(tree.get_mut(&42).is_none());
    }

    #[test]
    fn neighbours() {
        let tree = seven();
        assert_eq!(tree.next(&3).map(String::as_str), Some("4"));
        assert_eq!(tree.prev(&3).map(String::as_str), Some("2"));
        assert_eq!(tree.next(&7), None);
        assert_eq!(tree.prev(&1), None);
        assert_eq!(tree.next(&42), None);
        assert_eq!(tree.prev(&42), None);

        for i in 1..7 {
            assert_eq!(tree.next(&i), Some(&(i + 1).to_string()));
            assert_eq!(tree.prev(&(i + 1)), Some(&i.to_string()));
        }
    }

    #[test]
    fn remove_returns_values() {
        let mut tree = seven();
        for i in 1..=7 {
            assert_eq!(tree.remove(&i), Some(i.to_string()));
            tree.assert_valid();
            assert_eq!(tree.len(), usize::try_from(7 - i).unwrap());
        }
        assert!(tree.is_empty());
        assert_eq!(tree.remove(&1), None);
    }

    #[test]
    fn remove_node_with_two_children() {
        let mut tree = seven();
        // 4 is the root of a tree built from 1..=7 in order
        assert_eq!(node_at(&tree, &[]).map(|(k, _)| k), Some(4));

        assert_eq!(tree.remove(&4), Some("4".to_string()));
        tree.assert_valid();

        let keys: Vec<_> = tree.iterate(true).map(|(k, _)| *k).collect();
        assert_eq!(keys, [1, 2, 3, 5, 6, 7]);
    }

    #[test]
    fn remove_rotates_once_when_sibling_is_balanced() {
        //   2
        //  / \
        // 1   4
        //    / \
        //   3   5
        let mut tree = build(&[2, 1, 4, 3, 5]);
        assert_eq!(node_at(&tree, &[]), Some((2, 3)));

        // 2 keeps its height but leans right by two, 4 is evenly balanced
        tree.remove(&1);
        tree.assert_valid();

        assert_eq!(node_at(&tree, &[]), Some((4, 3)));
        assert_eq!(node_at(&tree, &[Side::Left]), Some((2, 2)));
        assert_eq!(node_at(&tree, &[Side::Left, Side::Right]), Some((3, 1)));
        assert_eq!(node_at(&tree, &[Side::Right]), Some((5, 1)));
    }

    #[test]
    fn remove_rotates_twice_when_sibling_leans_inward() {
        //   2
        //  / \
        // 1   4
        //    /
        //   3
        let mut tree = build(&[2, 1, 4, 3]);
        assert_eq!(node_at(&tree, &[Side::Right, Side::Left]), Some((3, 1)));

        tree.remove(&1);
        tree.assert_valid();

        assert_eq!(node_at(&tree, &[]), Some((3, 2)));
        assert_eq!(node_at(&tree, &[Side::Left]), Some((2, 1)));
        assert_eq!(node_at(&tree, &[Side::Right]), Some((4, 1)));
    }

    #[test]
    fn remove_stops_when_height_is_unchanged() {
        let mut tree = build(&[2, 1, 4, 3, 5]);

        // 4 keeps height 2 and leans left by one, nothing above it changes
        tree.remove(&5);
        tree.assert_valid();

        assert_eq!(node_at(&tree, &[]), Some((2, 3)));
        assert_eq!(node_at(&tree, &[Side::Left]), Some((1, 1)));
        assert_eq!(node_at(&tree, &[Side::Right]), Some((4, 2)));
        assert_eq!(node_at(&tree, &[Side::Right, Side::Left]), Some((3, 1)));
    }

    #[test]
    fn remove_missing_key() {
        let mut tree = seven();
        assert_eq!(tree.remove(&0), None);
        assert_eq!(tree.len(), 7);
        tree.assert_valid();
    }

    #[test]
    fn iterate_both_directions() {
        let tree = seven();

        let asc: Vec<_> = tree.iterate(true).map(|(k, _)| *k).collect();
        assert_eq!(asc, [1, 2, 3, 4, 5, 6, 7]);

        let desc: Vec<_> = tree.iterate(false).map(|(k, _)| *k).collect();
        assert_eq!(desc, [7, 6, 5, 4, 3, 2, 1]);

        // every invocation is a fresh traversal
        assert_eq!(tree.iterate(true).count(), 7);
        assert_eq!(tree.iterate(true).len(), 7);

        let mut iter = tree.iterate(true);
        assert_eq!(iter.next().map(|(k, _)| *k), Some(1));
        assert_eq!(iter.next_back().map(|(k, _)| *k), Some(7));
        assert_eq!(iter.len(), 5);
        assert_eq!(iter.rev().map(|(k, _)| *k).collect::<Vec<_>>(), [6, 5, 4, 3, 2]);
    }

    #[test]
    fn iterate_empty() {
        let tree: AvlTree<u8, u8> = AvlTree::ordered();
        assert_eq!(tree.iterate(true).next(), None);
        assert_eq!(tree.iterate(false).next(), None);
        assert_eq!(tree.first(), None);
        assert_eq!(tree.last(), None);
    }

    #[test]
    fn first_and_last() {
        let tree = seven();
        assert_eq!(tree.first().map(|(k, _)| *k), Some(1));
        assert_eq!(tree.last().map(|(k, _)| *k), Some(7));
    }

    #[test]
    fn custom_comparator() {
        let mut tree = AvlTree::new(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        tree.put("ccc", 3);
        tree.put("a", 1);
        tree.put("bb", 2);
        // same length means same key under this comparator
        tree.put("zz", 20);

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(&"xx"), Some(&2));
        let keys: Vec<_> = tree.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, ["a", "bb", "ccc"]);
        tree.assert_valid();
    }

    #[test]
    fn try_new_without_comparator() {
        let tree = AvlTree::<u32, u32, fn(&u32, &u32) -> Ordering>::try_new(None);
        assert_eq!(tree.err(), Some(Error::MissingComparator));

        let tree = AvlTree::<u32, u32, _>::try_new(Some(|a: &u32, b: &u32| a.cmp(b))).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn clear_resets() {
        let mut tree = seven();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
        tree.assert_valid();

        tree.put(1, "1".to_string());
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn height_stays_logarithmic() {
        let mut tree = AvlTree::ordered();
        for i in 0..1023 {
            tree.put(i, ());
        }
        tree.assert_valid();
        // a perfectly balanced tree of 1023 nodes has height 10, AVL allows ~1.44x that
        let (_, height) = node_at(&tree, &[]).unwrap();
        assert!(height <= 14, "height {height} too large");
    }

    #[cfg(not(target_os = "none"))]
    #[test]
    fn random_inserts_and_removals() {
        let mut tree = AvlTree::ordered();

        let mut rng = rand::rng();

        let mut nums = (0..500).collect::<Vec<_>>();
        nums.shuffle(&mut rng);

        for i in nums.clone() {
            tree.put(i, i * 2);
            tree.assert_valid();
        }
        assert_eq!(tree.len(), 500);

        nums.shuffle(&mut rng);

        for i in nums {
            assert_eq!(tree.remove(&i), Some(i * 2));
            tree.assert_valid();
        }
        assert!(tree.is_empty());
    }

    #[cfg(not(target_os = "none"))]
    #[test]
    fn random_inserts_and_searches() {
        let mut tree = AvlTree::ordered();

        let mut rng = rand::rng();

        let mut nums = (0..500).collect::<Vec<_>>();
        nums.shuffle(&mut rng);

        for i in nums.clone() {
            tree.put(i, i);
        }

        nums.shuffle(&mut rng);

        for i in nums {
            assert_eq!(tree.get(&i), Some(&i));
        }
    }

    #[test]
    fn drops_every_value() {
        use alloc::rc::Rc;

        let marker = Rc::new(());
        {
            let mut tree = AvlTree::ordered();
            for i in 0..64 {
                tree.put(i, Rc::clone(&marker));
            }
            drop(tree.remove(&10));
            assert_eq!(Rc::strong_count(&marker), 64);
        }
        assert_eq!(Rc::strong_count(&marker), 1);
    }
}
