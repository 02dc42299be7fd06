//! Benchmark parameter types.

use std::fmt;

/// Parameters for a traversal or rerouting benchmark run.
#[derive(Clone, Debug)]
pub struct SteinerBenchParams {
    /// Number of nodes in the graph.
    pub node_count: usize,
    /// Number of terminals the tree must reach.
    pub terminal_count: usize,
}

impl fmt::Display for SteinerBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n={},k={}", self.node_count, self.terminal_count)
    }
}
