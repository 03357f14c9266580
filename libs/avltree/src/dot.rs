use crate::AvlTree;
use crate::node::{Node, Side};
use core::fmt;
use core::ptr::NonNull;

/// Renders an [`AvlTree`] in [graphviz format](https://graphviz.org/doc/info/lang.html).
///
/// Returned by [`AvlTree::dot`].
pub struct Dot<'a, K, V, C> {
    pub(crate) tree: &'a AvlTree<K, V, C>,
}

impl<K, V, C> Dot<'_, K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    #[allow(
        clippy::only_used_in_recursion,
        reason = "need to ensure tree is borrowed for the entire time we operate on it"
    )]
    fn node_fmt(&self, f: &mut fmt::Formatter, node: NonNull<Node<K, V>>) -> fmt::Result {
        // Safety: the tree is borrowed for the lifetime of `self`, so all its nodes are live
        let node_ref = unsafe { node.as_ref() };
        let id = node.as_ptr().addr();

        writeln!(
            f,
            r#"  {id} [label="{:?}: {:?} (height = {}, balance = {})"];"#,
            node_ref.key,
            node_ref.value,
            node_ref.height,
            node_ref.balance_factor(),
        )?;

        if let Some(up) = node_ref.parent {
            writeln!(
                f,
                r#"  {id} -> {} [label="up", style=dashed];"#,
                up.as_ptr().addr()
            )?;
        }

        for side in [Side::Left, Side::Right] {
            if let Some(child) = node_ref.child(side) {
                writeln!(
                    f,
                    r#"  {id} -> {} [label="{side}"];"#,
                    child.as_ptr().addr()
                )?;
                self.node_fmt(f, child)?;
            }
        }

        Ok(())
    }
}

impl<K, V, C> fmt::Display for Dot<'_, K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph {{")?;
        if let Some(root) = self.tree.root {
            self.node_fmt(f, root)?;
        }
        writeln!(f, "}}")
    }
}

impl<K, V, C> fmt::Debug for Dot<'_, K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
