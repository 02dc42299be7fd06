//! First-child/next-sibling encoding of the current Steiner tree.
//!
//! Answers "how many children does this node have" in constant time while
//! the optimizer relinks nodes, which is all the pruning logic needs.

use bitvec::slice::BitSlice;

use crate::tree::{PRUNED, ROOT_NODE, TreeState};

const NONE: usize = usize::MAX;

/// Sibling-linked view over the nodes of a rooted tree.
///
/// `left` points at the previous sibling, or at the parent for the first
/// child. `right` points at the next sibling and `rightmost` at the last
/// child.
#[derive(Debug, Clone)]
pub(crate) struct SiblingTree<'a> {
    left: Vec<usize>,
    right: Vec<usize>,
    rightmost: Vec<usize>,
    terminals: &'a BitSlice,
}

impl<'a> SiblingTree<'a> {
    pub(crate) fn new(node_count: usize, terminals: &'a BitSlice) -> Self {
        Self {
            left: vec![NONE; node_count],
            right: vec![NONE; node_count],
            rightmost: vec![NONE; node_count],
            terminals,
        }
    }

    /// Mirrors every live edge of `tree`.
    pub(crate) fn from_tree(tree: &TreeState, terminals: &'a BitSlice) -> Self {
        let mut siblings = Self::new(tree.node_count(), terminals);
        for (node, &parent) in tree.parent.iter().enumerate() {
            if parent != PRUNED && parent != ROOT_NODE {
                siblings.link(node, parent);
            }
        }
        siblings
    }

    /// Appends `node` as the rightmost child of `parent`.
    pub(crate) fn link(&mut self, node: usize, parent: usize) {
        let last = self.rightmost[parent];
        if last == NONE {
            self.left[node] = parent;
        } else {
            self.right[last] = node;
            self.left[node] = last;
        }
        self.right[node] = NONE;
        self.rightmost[parent] = node;
    }

    /// Removes `node` from the children of `parent`.
    ///
    /// # Panics
    /// Panics when `node` is not linked.
    pub(crate) fn cut(&mut self, node: usize, parent: usize) {
        let previous = self.left[node];
        assert_ne!(previous, NONE, "node {node} is not linked below {parent}");
        let next = self.right[node];
        let first_child = previous == parent;

        if !first_child {
            self.right[previous] = next;
        }
        if next != NONE {
            self.left[next] = previous;
        }
        if self.rightmost[parent] == node {
            self.rightmost[parent] = if first_child { NONE } else { previous };
        }
        self.left[node] = NONE;
        self.right[node] = NONE;
    }

    #[rustfmt::skip]
    pub(crate) fn has_children(&self, node: usize) -> bool { self.rightmost[node] != NONE }

    /// Reports whether `node` has exactly one child.
    pub(crate) fn has_single_child(&self, node: usize) -> bool {
        let last = self.rightmost[node];
        last != NONE && self.left[last] == node
    }

    #[rustfmt::skip]
    pub(crate) fn is_terminal(&self, node: usize) -> bool { self.terminals[node] }

    /// A node is prunable when it is not a terminal and has at most one
    /// child.
    pub(crate) fn prunable(&self, node: usize) -> bool {
        let last = self.rightmost[node];
        !self.is_terminal(node) && (last == NONE || self.left[last] == node)
    }
}
