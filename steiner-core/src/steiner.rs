//! Steiner tree orchestration.
//!
//! Provides the [`SteinerTree`] runtime entry point that validates inputs
//! against a graph, drives the shortest-path phase into an initial tree and
//! optionally improves it with a rerouting pass.

use std::num::NonZeroUsize;

use bitvec::{bitvec, vec::BitVec};
use tracing::{info, instrument};

use crate::{
    Result,
    builder::ReroutingStrategy,
    delta::{EngineConfig, SteinerPaths},
    error::SteinerError,
    graph::Graph,
    initial_tree::{InitialTree, build_initial_tree},
    progress::{NullProgressTracker, ProgressTracker, RunningForever, TerminationFlag},
    reroute::{RerouteContext, Rerouter},
    result::SteinerTreeResult,
    tree::PRUNED,
};

const TRAVERSE_PHASE: &str = "Traverse";
const REROUTE_PHASE: &str = "Reroute";

/// Entry point for computing an approximate Steiner tree.
///
/// # Examples
/// ```
/// use steiner_core::{GraphBuilder, SteinerTreeBuilder};
///
/// let graph = GraphBuilder::new(4)
///     .with_edge(0, 1, Some(1.0))
///     .with_edge(1, 2, Some(1.0))
///     .with_edge(1, 3, Some(5.0))
///     .build()
///     .expect("edges are valid");
///
/// let result = SteinerTreeBuilder::new(0)
///     .with_terminals([2, 3])
///     .build()
///     .expect("configuration is valid")
///     .run(&graph)
///     .expect("run succeeds");
/// assert_eq!(result.total_cost(), 7.0);
/// assert_eq!(result.effective_target_count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct SteinerTree {
    source: usize,
    terminals: Vec<usize>,
    delta: f64,
    concurrency: NonZeroUsize,
    rerouting: Option<ReroutingStrategy>,
    bin_size_threshold: NonZeroUsize,
}

impl SteinerTree {
    pub(crate) fn new(
        source: usize,
        terminals: Vec<usize>,
        delta: f64,
        concurrency: NonZeroUsize,
        rerouting: Option<ReroutingStrategy>,
        bin_size_threshold: NonZeroUsize,
    ) -> Self {
        Self {
            source,
            terminals,
            delta,
            concurrency,
            rerouting,
            bin_size_threshold,
        }
    }

    /// Returns the source node.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the sorted, deduplicated terminals.
    #[must_use]
    #[rustfmt::skip]
    pub fn terminals(&self) -> &[usize] { &self.terminals }

    /// Returns the bucket width of the shortest-path search.
    #[must_use]
    #[rustfmt::skip]
    pub fn delta(&self) -> f64 { self.delta }

    /// Returns the number of shortest-path workers.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> NonZeroUsize { self.concurrency }

    /// Returns whether the rerouting pass runs.
    #[must_use]
    #[rustfmt::skip]
    pub fn rerouting(&self) -> bool { self.rerouting.is_some() }

    /// Returns the requested rerouting variant, or `None` when rerouting is
    /// disabled.
    #[must_use]
    #[rustfmt::skip]
    pub fn rerouting_strategy(&self) -> Option<ReroutingStrategy> { self.rerouting }

    /// Returns the local bucket threshold of the shortest-path workers.
    #[must_use]
    #[rustfmt::skip]
    pub fn bin_size_threshold(&self) -> NonZeroUsize { self.bin_size_threshold }

    /// Computes the tree without progress reporting or cancellation.
    ///
    /// # Errors
    /// See [`SteinerTree::run_with`].
    pub fn run<G: Graph>(&self, graph: &G) -> Result<SteinerTreeResult> {
        self.run_with(graph, &NullProgressTracker, &RunningForever)
    }

    /// Computes the tree, reporting phases to `progress` and polling
    /// `termination` between major steps.
    ///
    /// A terminal equal to the source is dropped. Unreachable terminals are
    /// tolerated and simply stay outside the tree.
    ///
    /// # Errors
    /// Returns [`SteinerError::EmptyGraph`] for a graph without nodes,
    /// [`SteinerError::SourceOutOfBounds`] or
    /// [`SteinerError::TerminalOutOfBounds`] for ids outside the graph,
    /// [`SteinerError::StrategyUnavailable`] when the requested rerouting
    /// variant needs adjacency the graph lacks,
    /// [`SteinerError::WorkerPool`] when the worker pool cannot start and
    /// [`SteinerError::Cancelled`] when `termination` stops the run.
    #[instrument(
        name = "steiner.run",
        err,
        skip(self, graph, progress, termination),
        fields(
            source = self.source,
            terminals = self.terminals.len(),
            delta = self.delta,
            concurrency = self.concurrency.get(),
            strategy = ?self.rerouting,
        ),
    )]
    pub fn run_with<G, P, T>(
        &self,
        graph: &G,
        progress: &P,
        termination: &T,
    ) -> Result<SteinerTreeResult>
    where
        G: Graph,
        P: ProgressTracker + ?Sized,
        T: TerminationFlag + ?Sized,
    {
        let node_count = graph.node_count();
        if node_count == 0 {
            return Err(SteinerError::EmptyGraph);
        }
        if self.source >= node_count {
            return Err(SteinerError::SourceOutOfBounds {
                source_node: self.source,
                node_count,
            });
        }
        if let Some(&terminal) = self.terminals.iter().find(|&&t| t >= node_count) {
            return Err(SteinerError::TerminalOutOfBounds {
                terminal,
                node_count,
            });
        }
        let rerouter = self
            .rerouting
            .map(|strategy| Rerouter::select(strategy, graph))
            .transpose()?;

        let targets: Vec<usize> = self
            .terminals
            .iter()
            .copied()
            .filter(|&t| t != self.source)
            .collect();
        let mut terminal_bits: BitVec = bitvec![0; node_count];
        for &target in &targets {
            terminal_bits.set(target, true);
        }

        let InitialTree {
            mut tree,
            totals,
            discovery,
        } = self.traverse(graph, &targets, &terminal_bits, progress, termination)?;

        let mut resolved = None;
        if let Some(rerouter) = rerouter {
            let volume = rerouter_volume(rerouter, node_count, &discovery);
            progress.begin_subtask(REROUTE_PHASE, volume);
            let ctx = RerouteContext {
                graph,
                terminals: &terminal_bits,
                discovery: &discovery,
                progress,
                termination,
            };
            rerouter.execute(&ctx, &mut tree, &totals)?;
            progress.end_subtask(REROUTE_PHASE);
            resolved = Some(rerouter.strategy());
        }

        let effective_targets = targets.iter().filter(|&&t| tree.is_live(t)).count();
        if effective_targets < targets.len() {
            info!(
                unreachable = targets.len() - effective_targets,
                "some terminals are not connected to the source"
            );
        }
        Ok(SteinerTreeResult::new(
            self.source,
            tree.parent,
            tree.parent_cost,
            totals.total_cost(),
            totals.effective_nodes(),
            effective_targets,
            resolved,
        ))
    }

    #[instrument(
        name = "steiner.traverse",
        skip_all,
        fields(targets = targets.len()),
    )]
    fn traverse<G, P, T>(
        &self,
        graph: &G,
        targets: &[usize],
        terminal_bits: &BitVec,
        progress: &P,
        termination: &T,
    ) -> Result<InitialTree>
    where
        G: Graph,
        P: ProgressTracker + ?Sized,
        T: TerminationFlag + ?Sized,
    {
        progress.begin_subtask(TRAVERSE_PHASE, targets.len());
        let config = EngineConfig {
            source: self.source,
            delta: self.delta,
            concurrency: self.concurrency.get(),
            bin_size_threshold: self.bin_size_threshold.get(),
        };
        let paths = SteinerPaths::new(graph, targets.to_vec(), config, termination)?;
        let initial = build_initial_tree(
            self.source,
            graph.node_count(),
            paths,
            terminal_bits,
            progress,
            termination,
        )?;
        progress.end_subtask(TRAVERSE_PHASE);
        info!(
            total_cost = initial.totals.total_cost(),
            nodes = initial.totals.effective_nodes(),
            "initial tree built"
        );
        Ok(initial)
    }
}

fn rerouter_volume(rerouter: Rerouter, node_count: usize, discovery: &[usize]) -> usize {
    match rerouter {
        Rerouter::ForwardScan => node_count,
        Rerouter::InverseIndexed | Rerouter::Extended => {
            discovery.iter().filter(|&&node| node != PRUNED).count()
        }
    }
}
