//! Seeded random graphs for benchmarking.
//!
//! Every generated graph contains a random spanning arborescence rooted at
//! node `0`, so each terminal is reachable from the source. Extra edges are
//! added on top until the requested average out-degree is met.

use rand::{Rng, SeedableRng, rngs::SmallRng, seq::index};
use steiner_core::{CsrGraph, GraphBuilder, Orientation};

use crate::error::BenchSetupError;

/// Errors that may occur during synthetic graph generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum SyntheticError {
    /// The graph needs at least two nodes to hold a source and a terminal.
    #[error("node count must be at least 2, got {got}")]
    TooFewNodes {
        /// Requested node count.
        got: usize,
    },
    /// More terminals were requested than non-source nodes exist.
    #[error("cannot pick {requested} terminals from {available} candidate nodes")]
    TooManyTerminals {
        /// Requested terminal count.
        requested: usize,
        /// Nodes other than the source.
        available: usize,
    },
    /// Weights are drawn from `1.0..=max_weight`.
    #[error("maximum weight must be finite and at least 1, got {got}")]
    InvalidMaxWeight {
        /// Supplied maximum.
        got: f64,
    },
}

/// Configuration for random graph generation.
#[derive(Clone, Debug)]
pub struct RandomGraphConfig {
    /// Number of nodes.
    pub node_count: usize,
    /// Target number of outgoing edges per node, backbone included.
    pub average_degree: usize,
    /// Upper bound of the uniform weight distribution.
    pub max_weight: f64,
    /// Number of terminals, drawn from the nodes other than `0`.
    pub terminal_count: usize,
    /// Whether to store every edge in both directions.
    pub orientation: Orientation,
    /// Whether to build the incoming-edge index.
    pub inverse_index: bool,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// A generated graph with its terminal set. The source is always node `0`.
#[derive(Clone, Debug)]
pub struct SyntheticGraph {
    /// The generated graph.
    pub graph: CsrGraph,
    /// Distinct terminals, none of them the source.
    pub terminals: Vec<usize>,
}

impl SyntheticGraph {
    /// Generates a graph and terminal set from `config`.
    ///
    /// # Errors
    /// Returns [`BenchSetupError::Synthetic`] for an unusable configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use steiner_benches::source::{RandomGraphConfig, SyntheticGraph};
    /// use steiner_core::{Graph, Orientation};
    ///
    /// let config = RandomGraphConfig {
    ///     node_count: 50,
    ///     average_degree: 4,
    ///     max_weight: 10.0,
    ///     terminal_count: 5,
    ///     orientation: Orientation::Natural,
    ///     inverse_index: false,
    ///     seed: 42,
    /// };
    /// let generated = SyntheticGraph::generate(&config).expect("valid config");
    /// assert_eq!(generated.graph.node_count(), 50);
    /// assert_eq!(generated.terminals.len(), 5);
    /// ```
    pub fn generate(config: &RandomGraphConfig) -> Result<Self, BenchSetupError> {
        let node_count = config.node_count;
        if node_count < 2 {
            return Err(SyntheticError::TooFewNodes { got: node_count }.into());
        }
        let available = node_count - 1;
        if config.terminal_count > available {
            return Err(SyntheticError::TooManyTerminals {
                requested: config.terminal_count,
                available,
            }
            .into());
        }
        if !config.max_weight.is_finite() || config.max_weight < 1.0 {
            return Err(SyntheticError::InvalidMaxWeight {
                got: config.max_weight,
            }
            .into());
        }

        let mut rng = SmallRng::seed_from_u64(config.seed);
        let mut builder = GraphBuilder::new(node_count)
            .with_orientation(config.orientation)
            .with_inverse_index(config.inverse_index);

        for node in 1..node_count {
            let parent = rng.gen_range(0..node);
            let weight = rng.gen_range(1.0..=config.max_weight);
            builder.push_edge(parent, node, Some(weight));
        }
        let extra = node_count
            .saturating_mul(config.average_degree)
            .saturating_sub(available);
        for _ in 0..extra {
            let source = rng.gen_range(0..node_count);
            let target = rng.gen_range(0..node_count);
            let weight = rng.gen_range(1.0..=config.max_weight);
            builder.push_edge(source, target, Some(weight));
        }

        let terminals = index::sample(&mut rng, available, config.terminal_count)
            .into_iter()
            .map(|offset| offset + 1)
            .collect();
        Ok(Self {
            graph: builder.build()?,
            terminals,
        })
    }
}
