//! Shared test utilities for `steiner-core`.

use proptest::test_runner::Config as ProptestConfig;
use steiner_test_support::ci::property_test_profile::ProptestRunProfile;

use crate::{
    graph::{CsrGraph, GraphBuilder},
    tree::{PRUNED, ROOT_NODE, TreeState},
};

/// Builds a standard proptest configuration from the shared CI profile.
///
/// This keeps property suites aligned on the same `PROGTEST_CASES` and
/// `STEINER_PBT_FORK` interpretation.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Builds a directed, inverse-indexed graph from weighted edges.
#[must_use]
pub(crate) fn indexed_graph(node_count: usize, edges: &[(usize, usize, f64)]) -> CsrGraph {
    GraphBuilder::new(node_count)
        .with_inverse_index(true)
        .with_edges(edges.iter().map(|&(s, t, w)| (s, t, Some(w))))
        .build()
        .expect("test edges must be valid")
}

/// Walks every live node to the root and panics on cycles or dangling
/// parents.
pub(crate) fn assert_valid_tree(tree: &TreeState) {
    for start in 0..tree.node_count() {
        if !tree.is_live(start) {
            continue;
        }
        let mut node = start;
        let mut steps = 0;
        while tree.parent[node] != ROOT_NODE {
            let parent = tree.parent[node];
            assert_ne!(parent, PRUNED, "node {node} hangs below a pruned parent");
            node = parent;
            steps += 1;
            assert!(steps <= tree.node_count(), "cycle through node {start}");
        }
        assert_eq!(node, tree.source, "node {start} does not reach the source");
    }
}

/// Nodes other than the source that are currently attached.
pub(crate) fn live_children(tree: &TreeState) -> impl Iterator<Item = usize> + '_ {
    tree.parent
        .iter()
        .enumerate()
        .filter(|(_, parent)| **parent != PRUNED && **parent != ROOT_NODE)
        .map(|(node, _)| node)
}

/// Sum of the parent costs of every attached non-root node.
#[must_use]
pub(crate) fn live_cost(tree: &TreeState) -> f64 {
    live_children(tree).map(|node| tree.parent_cost[node]).sum()
}
