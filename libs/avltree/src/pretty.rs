use crate::AvlTree;
use crate::node::Node;
use alloc::string::String;
use core::fmt;
use core::ptr::NonNull;

impl<K, V, C> fmt::Debug for AvlTree<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Renders the tree sideways below a title line, one `key: value` entry per line.
///
/// The title is printed even for an empty tree. The right subtree is printed above a node and the left subtree below it, so reading the output
/// from bottom to top yields the entries in ascending order:
///
/// ```text
/// AvlTree (len = 3)
/// │   ┌── 3: c
/// └── 2: b
///     └── 1: a
/// ```
impl<K, V, C> fmt::Display for AvlTree<K, V, C>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "AvlTree (len = {})", self.len)?;
        if let Some(root) = self.root {
            // Safety: the root and all its descendants are live nodes owned by this tree
            unsafe { fmt_subtree(f, root, "", true)? };
        }

        Ok(())
    }
}

/// # Safety
///
/// `node` and all of its descendants must be live nodes.
unsafe fn fmt_subtree<K, V>(
    f: &mut fmt::Formatter<'_>,
    node: NonNull<Node<K, V>>,
    prefix: &str,
    is_tail: bool,
) -> fmt::Result
where
    K: fmt::Display,
    V: fmt::Display,
{
    // Safety: ensured by caller
    let node = unsafe { node.as_ref() };

    if let Some(right) = node.right {
        let mut child_prefix = String::from(prefix);
        child_prefix.push_str(if is_tail { "│   " } else { "    " });
        // Safety: children of a live node are live
        unsafe { fmt_subtree(f, right, &child_prefix, false)? };
    }

    let connector = if is_tail { "└── " } else { "┌── " };
    writeln!(f, "{prefix}{connector}{}: {}", node.key, node.value)?;

    if let Some(left) = node.left {
        let mut child_prefix = String::from(prefix);
        child_prefix.push_str(if is_tail { "    " } else { "│   " });
        // Safety: children of a live node are live
        unsafe { fmt_subtree(f, left, &child_prefix, true)? };
    }

    Ok(())
}
