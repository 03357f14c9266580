use alloc::boxed::Box;
use core::fmt;
use core::ptr::NonNull;

pub(crate) type Link<K, V> = Option<NonNull<Node<K, V>>>;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

impl Side {
    pub(crate) fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A single entry of an [`AvlTree`][crate::AvlTree].
///
/// Nodes are heap allocated by the tree and only ever referenced through [`NonNull`] links. The
/// `parent` link is a plain back-reference and never keeps a node alive; ownership of every node
/// rests with the tree itself.
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Height of the subtree rooted at this node. Leaves have height 1, missing children count as 0.
    pub(crate) height: u32,
    pub(crate) parent: Link<K, V>,
    pub(crate) left: Link<K, V>,
    pub(crate) right: Link<K, V>,
}

impl<K, V> Node<K, V> {
    /// Allocates a new leaf node and leaks it into a raw link.
    ///
    /// The returned pointer must eventually be released through [`Node::free`].
    pub(crate) fn alloc(key: K, value: V, parent: Link<K, V>) -> NonNull<Self> {
        let node = Box::new(Self {
            key,
            value,
            height: 1,
            parent,
            left: None,
            right: None,
        });
        NonNull::from(Box::leak(node))
    }

    /// Reclaims a node previously returned by [`Node::alloc`].
    ///
    /// # Safety
    ///
    /// `ptr` must originate from [`Node::alloc`], must not have been freed before and no other
    /// live link may be used to access it afterward.
    pub(crate) unsafe fn free(ptr: NonNull<Self>) -> Box<Self> {
        // Safety: ensured by caller
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Link<K, V> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Link<K, V>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// The height this node should have given the stored heights of its children.
    #[inline]
    pub(crate) fn computed_height(&self) -> u32 {
        // Safety: children of a linked node are always live nodes of the same tree
        let (lh, rh) = unsafe { (height(self.left), height(self.right)) };
        1 + lh.max(rh)
    }

    /// Left subtree height minus right subtree height.
    #[inline]
    pub(crate) fn balance_factor(&self) -> i64 {
        // Safety: children of a linked node are always live nodes of the same tree
        let (lh, rh) = unsafe { (height(self.left), height(self.right)) };
        i64::from(lh) - i64::from(rh)
    }

    #[inline]
    pub(crate) fn update_height(&mut self) {
        self.height = self.computed_height();
    }
}

/// Returns the stored height of `link`, treating a missing node as height 0.
///
/// # Safety
///
/// If `link` is `Some`, it must point to a live node.
#[inline]
pub(crate) unsafe fn height<K, V>(link: Link<K, V>) -> u32 {
    // Safety: ensured by caller
    link.map_or(0, |node| unsafe { node.as_ref().height })
}

/// # Safety
///
/// `curr` and all of its descendants must be live nodes.
pub(crate) unsafe fn find_minimum<K, V>(mut curr: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
    // Safety: ensured by caller
    while let Some(left) = unsafe { curr.as_ref().left } {
        curr = left;
    }

    curr
}

/// # Safety
///
/// `curr` and all of its descendants must be live nodes.
pub(crate) unsafe fn find_maximum<K, V>(mut curr: NonNull<Node<K, V>>) -> NonNull<Node<K, V>> {
    // Safety: ensured by caller
    while let Some(right) = unsafe { curr.as_ref().right } {
        curr = right;
    }

    curr
}

/// Returns the in-order successor of `node`.
///
/// # Safety
///
/// `node` must be a live node whose parent and child links are consistent.
pub(crate) unsafe fn next<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V> {
    // Safety: ensured by caller
    unsafe {
        // If we have a right child, its least descendant is our next node
        if let Some(right) = node.as_ref().right {
            return Some(find_minimum(right));
        }

        let mut curr = node;
        while let Some(parent) = curr.as_ref().parent {
            // the first ancestor we reach through its left/lesser edge is our next node
            if parent.as_ref().left == Some(curr) {
                return Some(parent);
            }
            curr = parent;
        }

        // we reached the tree root without finding a next node
        None
    }
}

/// Returns the in-order predecessor of `node`.
///
/// # Safety
///
/// `node` must be a live node whose parent and child links are consistent.
pub(crate) unsafe fn prev<K, V>(node: NonNull<Node<K, V>>) -> Link<K, V> {
    // Safety: ensured by caller
    unsafe {
        // If we have a left child, its greatest descendant is our previous node
        if let Some(left) = node.as_ref().left {
            return Some(find_maximum(left));
        }

        let mut curr = node;
        while let Some(parent) = curr.as_ref().parent {
            // the first ancestor we reach through its right/greater edge is our previous node
            if parent.as_ref().right == Some(curr) {
                return Some(parent);
            }
            curr = parent;
        }

        // we reached the tree root without finding a previous node
        None
    }
}
