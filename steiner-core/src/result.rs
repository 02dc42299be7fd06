//! Result types for Steiner tree computations.

use crate::{
    builder::ReroutingStrategy,
    tree::{PRUNED, ROOT_NODE},
};

/// Relationship of a node to the computed tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentLink {
    /// The node is the source.
    Root,
    /// The node is not part of the tree.
    Pruned,
    /// The node hangs below the given parent.
    Node(usize),
}

/// Represents the output of a [`crate::SteinerTree::run`] invocation.
///
/// # Examples
/// ```
/// use steiner_core::{GraphBuilder, ParentLink, SteinerTreeBuilder};
///
/// let graph = GraphBuilder::new(3)
///     .with_edge(0, 1, Some(2.0))
///     .with_edge(1, 2, Some(3.0))
///     .build()
///     .expect("edges are valid");
/// let result = SteinerTreeBuilder::new(0)
///     .with_terminals([2])
///     .build()
///     .expect("configuration is valid")
///     .run(&graph)
///     .expect("run succeeds");
///
/// assert_eq!(result.parent(2), ParentLink::Node(1));
/// assert_eq!(result.parent(0), ParentLink::Root);
/// assert_eq!(result.path_to_source(2), Some(vec![2, 1, 0]));
/// assert_eq!(result.effective_node_count(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SteinerTreeResult {
    source: usize,
    parent: Vec<usize>,
    parent_cost: Vec<f64>,
    total_cost: f64,
    effective_node_count: usize,
    effective_target_count: usize,
    rerouting_strategy: Option<ReroutingStrategy>,
}

impl SteinerTreeResult {
    pub(crate) fn new(
        source: usize,
        parent: Vec<usize>,
        parent_cost: Vec<f64>,
        total_cost: f64,
        effective_node_count: usize,
        effective_target_count: usize,
        rerouting_strategy: Option<ReroutingStrategy>,
    ) -> Self {
        Self {
            source,
            parent,
            parent_cost,
            total_cost,
            effective_node_count,
            effective_target_count,
            rerouting_strategy,
        }
    }

    /// Returns the source node.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the number of nodes covered by the parent arrays.
    #[must_use]
    #[rustfmt::skip]
    pub fn node_count(&self) -> usize { self.parent.len() }

    /// Returns the raw parent array, using [`crate::ROOT_NODE`] and
    /// [`crate::PRUNED`] as sentinels.
    #[must_use]
    #[rustfmt::skip]
    pub fn parent_array(&self) -> &[usize] { &self.parent }

    /// Returns the raw parent-cost array, using [`crate::PRUNED_COST`] for
    /// pruned nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn parent_costs(&self) -> &[f64] { &self.parent_cost }

    /// Returns the sum of the costs of every tree edge.
    #[must_use]
    #[rustfmt::skip]
    pub fn total_cost(&self) -> f64 { self.total_cost }

    /// Returns the number of nodes in the tree, source included.
    #[must_use]
    #[rustfmt::skip]
    pub fn effective_node_count(&self) -> usize { self.effective_node_count }

    /// Returns the number of terminals connected to the source.
    #[must_use]
    #[rustfmt::skip]
    pub fn effective_target_count(&self) -> usize { self.effective_target_count }

    /// Returns the rerouting variant that ran, if any.
    #[must_use]
    #[rustfmt::skip]
    pub fn rerouting_strategy(&self) -> Option<ReroutingStrategy> { self.rerouting_strategy }

    /// Classifies `node`. Ids outside the graph are reported as pruned.
    #[must_use]
    pub fn parent(&self, node: usize) -> ParentLink {
        match self.parent.get(node) {
            Some(&ROOT_NODE) => ParentLink::Root,
            None | Some(&PRUNED) => ParentLink::Pruned,
            Some(&parent) => ParentLink::Node(parent),
        }
    }

    /// Cost of the edge entering `node`, or `None` for pruned nodes.
    #[must_use]
    pub fn parent_cost(&self, node: usize) -> Option<f64> {
        match self.parent(node) {
            ParentLink::Pruned => None,
            ParentLink::Root | ParentLink::Node(_) => Some(self.parent_cost[node]),
        }
    }

    /// Nodes from `node` up to and including the source, or `None` when
    /// `node` is not part of the tree.
    #[must_use]
    pub fn path_to_source(&self, node: usize) -> Option<Vec<usize>> {
        let mut path = Vec::new();
        let mut current = node;
        loop {
            path.push(current);
            match self.parent(current) {
                ParentLink::Root => return Some(path),
                ParentLink::Pruned => return None,
                ParentLink::Node(parent) => current = parent,
            }
            if path.len() > self.parent.len() {
                return None;
            }
        }
    }

    /// Iterates `(parent, child, cost)` for every tree edge in child order.
    pub fn live_edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.parent
            .iter()
            .zip(&self.parent_cost)
            .enumerate()
            .filter(|(_, (parent, _))| **parent != ROOT_NODE && **parent != PRUNED)
            .map(|(child, (&parent, &cost))| (parent, child, cost))
    }
}
