//! Read-only adjacency abstraction consumed by the Steiner algorithms.
//!
//! The algorithms only ever iterate relationships of a single node at a time,
//! so the [`Graph`] trait exposes visitor-style iteration rather than
//! materialised neighbour lists. [`CsrGraph`] is the in-memory implementation
//! used by the CLI, the benchmarks and the tests.

mod csr;

pub use csr::{CsrGraph, GraphBuilder, Orientation};

/// Weighted adjacency consumed by the shortest-path engine and the rerouting
/// optimizer.
///
/// Visitors receive `(node, neighbour, weight)` and return `true` to keep
/// iterating or `false` to stop early for that node.
///
/// # Examples
/// ```
/// use steiner_core::{Graph, GraphBuilder};
///
/// let graph = GraphBuilder::new(3)
///     .with_edge(0, 1, Some(2.5))
///     .with_edge(0, 2, None)
///     .build()
///     .expect("edges are valid");
///
/// let mut seen = Vec::new();
/// graph.for_each_relationship(0, 1.0, |_, target, weight| {
///     seen.push((target, weight));
///     true
/// });
/// assert_eq!(seen, vec![(1, 2.5), (2, 1.0)]);
/// ```
pub trait Graph: Sync {
    /// Returns the number of nodes. Node ids are dense in `0..node_count()`.
    fn node_count(&self) -> usize;

    /// Returns the number of stored forward relationships.
    fn relationship_count(&self) -> usize;

    /// Visits every outgoing relationship `node -> target`.
    ///
    /// Relationships stored without a weight are reported with
    /// `default_weight`.
    fn for_each_relationship<F>(&self, node: usize, default_weight: f64, visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool;

    /// Visits every incoming relationship `neighbour -> node`, reported as
    /// `(node, neighbour, weight)`.
    ///
    /// Graphs without an inverse index visit nothing.
    fn for_each_inverse_relationship<F>(&self, node: usize, default_weight: f64, visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool,
    {
        let _ = (node, default_weight, visitor);
    }

    /// Reports whether [`Graph::for_each_inverse_relationship`] is backed by
    /// an index.
    fn is_inverse_indexed(&self) -> bool {
        false
    }

    /// Reports whether every relationship is stored in both directions.
    fn is_undirected(&self) -> bool {
        false
    }
}
