use bitvec::slice::BitSlice;

use super::distances::TentativeDistances;

/// Path from an already-merged node to a newly reached terminal.
///
/// `node_ids[0]` is the merged node the path hangs from and `costs[i]` is the
/// cumulative cost from `node_ids[0]` to `node_ids[i]`, so `costs[0]` is
/// always zero.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PathResult {
    pub(crate) index: usize,
    pub(crate) target: usize,
    pub(crate) node_ids: Vec<usize>,
    pub(crate) costs: Vec<f64>,
}

impl PathResult {
    /// Walks predecessors back from `target` until a merged node is met.
    pub(super) fn trace(
        index: usize,
        target: usize,
        distances: &TentativeDistances,
        merged: &BitSlice,
    ) -> Self {
        let mut node_ids = Vec::new();
        let mut costs = Vec::new();
        let mut current = target;
        loop {
            node_ids.push(current);
            if merged[current] {
                costs.push(0.0);
                break;
            }
            costs.push(distances.distance(current));
            current = distances.predecessor(current);
        }
        node_ids.reverse();
        costs.reverse();
        Self {
            index,
            target,
            node_ids,
            costs,
        }
    }

    /// Yields `(parent, child, edge_cost)` from the top of the path down.
    pub(crate) fn edges(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.node_ids
            .windows(2)
            .zip(self.costs.windows(2))
            .map(|(nodes, costs)| (nodes[0], nodes[1], costs[1] - costs[0]))
    }
}
