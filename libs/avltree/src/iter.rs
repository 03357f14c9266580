use crate::node::{self, Link, Node};
use core::iter::FusedIterator;
use core::marker::PhantomData;

/// A lazy, ordered iterator over the entries of an [`AvlTree`][crate::AvlTree].
///
/// Created by [`AvlTree::iterate`][crate::AvlTree::iterate] and [`AvlTree::iter`][crate::AvlTree::iter].
/// The iterator walks parent links between neighbouring nodes, so it never allocates and every
/// step costs O(1) amortized. Iterating from the back yields entries in the opposite order.
pub struct Iter<'a, K, V> {
    pub(crate) head: Link<K, V>,
    pub(crate) tail: Link<K, V>,
    pub(crate) remaining: usize,
    pub(crate) ascending: bool,
    pub(crate) _tree: PhantomData<&'a Node<K, V>>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    #[inline]
    fn clone(&self) -> Self {
        Iter {
            head: self.head,
            tail: self.tail,
            remaining: self.remaining,
            ascending: self.ascending,
            _tree: PhantomData,
        }
    }
}

impl<'a, K, V> Iter<'a, K, V> {
    fn take_head(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let head = self.head?;
        self.remaining -= 1;

        // Safety: the iterator borrows the tree for 'a, so every node stays alive and linked
        unsafe {
            self.head = node::next(head);
            let node = head.as_ref();
            Some((&node.key, &node.value))
        }
    }

    fn take_tail(&mut self) -> Option<(&'a K, &'a V)> {
        if self.remaining == 0 {
            return None;
        }
        let tail = self.tail?;
        self.remaining -= 1;

        // Safety: the iterator borrows the tree for 'a, so every node stays alive and linked
        unsafe {
            self.tail = node::prev(tail);
            let node = tail.as_ref();
            Some((&node.key, &node.value))
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.ascending {
            self.take_head()
        } else {
            self.take_tail()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.ascending {
            self.take_tail()
        } else {
            self.take_head()
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

// Safety: `Iter` only hands out shared references, so it behaves like `&'a (K, V)`
unsafe impl<K: Sync, V: Sync> Send for Iter<'_, K, V> {}
// Safety: see above
unsafe impl<K: Sync, V: Sync> Sync for Iter<'_, K, V> {}
