//! Link-cut tree over the nodes of a rooted Steiner tree.
//!
//! Each tree edge `parent -> child` is represented by a synthetic node placed
//! between the two endpoints, so an edge can be removed by cutting on both
//! sides of it. Nodes live in an index arena: graph node `v` occupies slot `v`
//! and the edge entering `v` occupies slot `node_count + v`.
//!
//! The structure is single-threaded. One instance serves one rerouting pass
//! and is rebuilt from the parent array every time rerouting starts.

use crate::tree::{PRUNED, ROOT_NODE, TreeState};

const NIL: usize = usize::MAX;

/// Pending-reversal state of a splay node.
///
/// A node in [`Reversal::PendingReverse`] has children that still need to be
/// swapped; [`LinkCutTree::push_down`] settles it before children are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reversal {
    Clean,
    PendingReverse,
}

impl Reversal {
    #[rustfmt::skip]
    fn flipped(self) -> Self {
        match self { Self::Clean => Self::PendingReverse, Self::PendingReverse => Self::Clean }
    }
}

/// Dynamic forest supporting amortised `O(log n)` link, delete and
/// connectivity queries.
///
/// # Examples
/// ```
/// use steiner_core::LinkCutTree;
///
/// let mut tree = LinkCutTree::new(4);
/// tree.link(0, 1);
/// tree.link(1, 2);
/// assert!(tree.connected(0, 2));
/// assert!(!tree.connected(0, 3));
///
/// tree.delete(1, 2);
/// assert!(!tree.connected(0, 2));
/// assert!(!tree.contains(1, 2));
/// ```
#[derive(Debug, Clone)]
pub struct LinkCutTree {
    node_count: usize,
    up: Vec<usize>,
    left: Vec<usize>,
    right: Vec<usize>,
    reversal: Vec<Reversal>,
    // Source endpoint of the edge entering each node, `NIL` when detached.
    edge_source: Vec<usize>,
    scratch: Vec<usize>,
}

impl LinkCutTree {
    /// Creates a forest of `node_count` isolated nodes.
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        let slots = node_count * 2;
        Self {
            node_count,
            up: vec![NIL; slots],
            left: vec![NIL; slots],
            right: vec![NIL; slots],
            reversal: vec![Reversal::Clean; slots],
            edge_source: vec![NIL; node_count],
            scratch: Vec::new(),
        }
    }

    /// Builds a forest mirroring every live edge of `tree`.
    pub(crate) fn from_tree(tree: &TreeState) -> Self {
        let mut lct = Self::new(tree.node_count());
        for (child, &parent) in tree.parent.iter().enumerate() {
            if parent != PRUNED && parent != ROOT_NODE {
                lct.link(parent, child);
            }
        }
        lct
    }

    /// Returns the number of graph nodes tracked by the forest.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Attaches `child` below `parent`.
    ///
    /// # Panics
    /// Panics when `child` already has a parent edge or when either id is
    /// out of range.
    pub fn link(&mut self, parent: usize, child: usize) {
        assert!(
            parent < self.node_count && child < self.node_count,
            "link ({parent}, {child}) is out of range for {} nodes",
            self.node_count
        );
        assert_eq!(
            self.edge_source[child], NIL,
            "node {child} already has a parent edge"
        );
        let edge = self.edge_slot(child);
        self.evert(child);
        self.up[child] = edge;
        self.up[edge] = parent;
        self.edge_source[child] = parent;
    }

    /// Removes the edge `source -> target`.
    ///
    /// # Panics
    /// Panics when the edge is not present.
    pub fn delete(&mut self, source: usize, target: usize) {
        assert!(
            self.contains(source, target),
            "edge ({source}, {target}) is not part of the forest"
        );
        let edge = self.edge_slot(target);
        self.evert(source);
        self.cut_adjacent(source, edge);
        self.cut_adjacent(edge, target);
        self.reversal[edge] = Reversal::Clean;
        self.edge_source[target] = NIL;
    }

    /// Reports whether `a` and `b` belong to the same tree.
    pub fn connected(&mut self, a: usize, b: usize) -> bool {
        a == b || self.find_root(a) == self.find_root(b)
    }

    /// Reports whether the edge entering `target` starts at `source`.
    #[must_use]
    pub fn contains(&self, source: usize, target: usize) -> bool {
        self.edge_source.get(target).is_some_and(|&s| s == source)
    }

    #[rustfmt::skip]
    fn edge_slot(&self, child: usize) -> usize { self.node_count + child }

    fn is_splay_root(&self, x: usize) -> bool {
        let p = self.up[x];
        p == NIL || (self.left[p] != x && self.right[p] != x)
    }

    fn push_down(&mut self, x: usize) {
        if self.reversal[x] == Reversal::PendingReverse {
            let (l, r) = (self.left[x], self.right[x]);
            self.left[x] = r;
            self.right[x] = l;
            for child in [l, r] {
                if child != NIL {
                    self.reversal[child] = self.reversal[child].flipped();
                }
            }
            self.reversal[x] = Reversal::Clean;
        }
    }

    fn rotate(&mut self, x: usize) {
        let p = self.up[x];
        let g = self.up[p];
        let p_was_root = self.is_splay_root(p);

        if self.left[p] == x {
            let moved = self.right[x];
            self.left[p] = moved;
            if moved != NIL {
                self.up[moved] = p;
            }
            self.right[x] = p;
        } else {
            let moved = self.left[x];
            self.right[p] = moved;
            if moved != NIL {
                self.up[moved] = p;
            }
            self.left[x] = p;
        }
        self.up[p] = x;
        self.up[x] = g;

        if !p_was_root {
            if self.left[g] == p {
                self.left[g] = x;
            } else {
                self.right[g] = x;
            }
        }
    }

    fn splay(&mut self, x: usize) {
        // Settle pending reversals from the auxiliary root down to x.
        let mut stack = std::mem::take(&mut self.scratch);
        let mut y = x;
        stack.push(y);
        while !self.is_splay_root(y) {
            y = self.up[y];
            stack.push(y);
        }
        while let Some(node) = stack.pop() {
            self.push_down(node);
        }
        self.scratch = stack;

        while !self.is_splay_root(x) {
            let p = self.up[x];
            if !self.is_splay_root(p) {
                let g = self.up[p];
                let zig_zig = (self.left[g] == p) == (self.left[p] == x);
                if zig_zig {
                    self.rotate(p);
                } else {
                    self.rotate(x);
                }
            }
            self.rotate(x);
        }
    }

    fn access(&mut self, x: usize) {
        let mut last = NIL;
        let mut y = x;
        while y != NIL {
            self.splay(y);
            self.right[y] = last;
            last = y;
            y = self.up[y];
        }
        self.splay(x);
    }

    fn evert(&mut self, x: usize) {
        self.access(x);
        self.reversal[x] = self.reversal[x].flipped();
        self.push_down(x);
    }

    fn find_root(&mut self, x: usize) -> usize {
        self.access(x);
        let mut y = x;
        loop {
            self.push_down(y);
            let next = self.left[y];
            if next == NIL {
                break;
            }
            y = next;
        }
        self.splay(y);
        y
    }

    /// Detaches `child` from `parent`, which must be adjacent with `parent`
    /// being the represented root.
    fn cut_adjacent(&mut self, parent: usize, child: usize) {
        self.access(child);
        let detached = self.left[child];
        assert_eq!(
            detached, parent,
            "slot {child} is not directly below slot {parent}"
        );
        self.left[child] = NIL;
        self.up[detached] = NIL;
    }
}
