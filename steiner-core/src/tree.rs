//! Parent-array tree representation shared by the builder and the optimizer.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Parent entry of the source node.
pub const ROOT_NODE: usize = usize::MAX;

/// Parent entry of a node that is not part of the tree.
pub const PRUNED: usize = usize::MAX - 1;

/// Parent-cost entry of a node that is not part of the tree.
pub const PRUNED_COST: f64 = -1.0;

/// Running totals of the tree under construction.
///
/// Passed by reference through the builder and the optimizer so that neither
/// phase depends on process-wide state.
#[derive(Debug)]
pub(crate) struct TreeTotals {
    total_cost: AtomicU64,
    effective_nodes: AtomicUsize,
}

impl TreeTotals {
    /// Totals of a tree holding only the source.
    pub(crate) fn with_source() -> Self {
        Self {
            total_cost: AtomicU64::new(0.0_f64.to_bits()),
            effective_nodes: AtomicUsize::new(1),
        }
    }

    pub(crate) fn add_cost(&self, delta: f64) {
        let mut current = self.total_cost.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + delta).to_bits();
            match self.total_cost.compare_exchange_weak(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(witness) => current = witness,
            }
        }
    }

    #[rustfmt::skip]
    pub(crate) fn subtract_cost(&self, delta: f64) { self.add_cost(-delta); }

    #[rustfmt::skip]
    pub(crate) fn total_cost(&self) -> f64 { f64::from_bits(self.total_cost.load(Ordering::Acquire)) }

    #[rustfmt::skip]
    pub(crate) fn node_attached(&self) { self.effective_nodes.fetch_add(1, Ordering::Relaxed); }

    #[rustfmt::skip]
    pub(crate) fn node_pruned(&self) { self.effective_nodes.fetch_sub(1, Ordering::Relaxed); }

    #[rustfmt::skip]
    pub(crate) fn effective_nodes(&self) -> usize { self.effective_nodes.load(Ordering::Relaxed) }
}

/// Parent and parent-cost arrays over every node of the graph.
#[derive(Debug, Clone)]
pub(crate) struct TreeState {
    pub(crate) source: usize,
    pub(crate) parent: Vec<usize>,
    pub(crate) parent_cost: Vec<f64>,
}

impl TreeState {
    /// A tree containing only `source`; every other node is pruned.
    pub(crate) fn rooted_at(source: usize, node_count: usize) -> Self {
        let mut parent = vec![PRUNED; node_count];
        let mut parent_cost = vec![PRUNED_COST; node_count];
        parent[source] = ROOT_NODE;
        parent_cost[source] = 0.0;
        Self {
            source,
            parent,
            parent_cost,
        }
    }

    #[rustfmt::skip]
    pub(crate) fn node_count(&self) -> usize { self.parent.len() }

    #[rustfmt::skip]
    pub(crate) fn is_live(&self, node: usize) -> bool { self.parent[node] != PRUNED }

    /// Replaces the parent edge of `node`.
    pub(crate) fn set_parent(&mut self, node: usize, parent: usize, cost: f64) {
        self.parent[node] = parent;
        self.parent_cost[node] = cost;
    }

    /// Marks `node` as no longer part of the tree and returns its old cost.
    pub(crate) fn prune(&mut self, node: usize) -> f64 {
        let cost = self.parent_cost[node];
        self.parent[node] = PRUNED;
        self.parent_cost[node] = PRUNED_COST;
        cost
    }
}
