//! Post-processing that replaces expensive tree edges with cheaper ones.
//!
//! Every variant keeps the tree acyclic by testing each candidate edge
//! against a [`LinkCutTree`] mirror of the parent array, and every variant
//! leaves the total cost no higher than it found it.

mod forward;
mod priority;

#[cfg(test)]
mod tests;

use bitvec::slice::BitSlice;
use tracing::{info, instrument};

use crate::{
    Result,
    builder::ReroutingStrategy,
    error::SteinerError,
    graph::Graph,
    link_cut::LinkCutTree,
    progress::{ProgressTracker, TerminationFlag},
    tree::{TreeState, TreeTotals},
};

/// Weight assumed for relationships stored without one.
const DEFAULT_WEIGHT: f64 = 1.0;

/// Rerouting variant resolved against the capabilities of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rerouter {
    /// Scans every forward relationship of every tree node.
    ForwardScan,
    /// Replays discovered paths segment by segment over incoming edges.
    InverseIndexed,
    /// Replays the flat discovery queue over incoming edges, or over forward
    /// edges of an undirected graph.
    Extended,
}

impl Rerouter {
    /// Resolves `strategy` for `graph`.
    ///
    /// # Errors
    /// Returns [`SteinerError::StrategyUnavailable`] when an explicitly
    /// requested variant needs adjacency the graph does not expose.
    pub(crate) fn select<G: Graph>(strategy: ReroutingStrategy, graph: &G) -> Result<Self> {
        match strategy {
            ReroutingStrategy::Auto => Ok(if graph.is_inverse_indexed() && !graph.is_undirected() {
                Self::InverseIndexed
            } else {
                Self::ForwardScan
            }),
            ReroutingStrategy::ForwardScan => Ok(Self::ForwardScan),
            ReroutingStrategy::InverseIndexed if graph.is_inverse_indexed() => {
                Ok(Self::InverseIndexed)
            }
            ReroutingStrategy::InverseIndexed => Err(SteinerError::StrategyUnavailable {
                requested: strategy,
                requirement: "an inverse-indexed graph",
            }),
            ReroutingStrategy::Extended
                if graph.is_inverse_indexed() || graph.is_undirected() =>
            {
                Ok(Self::Extended)
            }
            ReroutingStrategy::Extended => Err(SteinerError::StrategyUnavailable {
                requested: strategy,
                requirement: "an inverse-indexed or undirected graph",
            }),
        }
    }

    /// Strategy reported back to callers once resolved.
    #[must_use]
    pub(crate) fn strategy(self) -> ReroutingStrategy {
        match self {
            Self::ForwardScan => ReroutingStrategy::ForwardScan,
            Self::InverseIndexed => ReroutingStrategy::InverseIndexed,
            Self::Extended => ReroutingStrategy::Extended,
        }
    }

    /// Improves `tree` in place, keeping `totals` in step.
    ///
    /// # Errors
    /// Returns [`SteinerError::Cancelled`] when `ctx.termination` stops the
    /// pass. The tree is left valid but possibly only partially improved.
    #[instrument(
        name = "steiner.reroute",
        skip_all,
        fields(variant = ?self, nodes = tree.node_count()),
    )]
    pub(crate) fn execute<G, P, T>(
        self,
        ctx: &RerouteContext<'_, G, P, T>,
        tree: &mut TreeState,
        totals: &TreeTotals,
    ) -> Result<RerouteStats>
    where
        G: Graph,
        P: ProgressTracker + ?Sized,
        T: TerminationFlag + ?Sized,
    {
        let before = totals.total_cost();
        let stats = match self {
            Self::ForwardScan => forward::reroute(ctx, tree, totals)?,
            Self::InverseIndexed => {
                priority::reroute(ctx, tree, totals, priority::Traversal::Segments)?
            }
            Self::Extended => priority::reroute(ctx, tree, totals, priority::Traversal::Queue)?,
        };
        info!(
            applied = stats.applied,
            rejected = stats.rejected,
            pruned = stats.pruned,
            cost_before = before,
            cost_after = totals.total_cost(),
            "rerouting finished"
        );
        stats.record_metrics();
        Ok(stats)
    }
}

/// Read-only collaborators shared by every variant.
pub(crate) struct RerouteContext<'a, G, P: ?Sized, T: ?Sized> {
    pub(crate) graph: &'a G,
    pub(crate) terminals: &'a BitSlice,
    pub(crate) discovery: &'a [usize],
    pub(crate) progress: &'a P,
    pub(crate) termination: &'a T,
}

/// Counters describing one rerouting pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RerouteStats {
    pub(crate) applied: usize,
    pub(crate) rejected: usize,
    pub(crate) pruned: usize,
}

impl RerouteStats {
    #[cfg(feature = "metrics")]
    fn record_metrics(&self) {
        metrics::counter!("steiner_reroutes_applied").increment(self.applied as u64);
        metrics::counter!("steiner_reroutes_rejected").increment(self.rejected as u64);
        metrics::counter!("steiner_nodes_pruned").increment(self.pruned as u64);
    }

    #[cfg(not(feature = "metrics"))]
    fn record_metrics(&self) {}
}

/// Deletes the edge currently entering `target` and reports whether
/// `source -> target` can replace it without closing a cycle.
///
/// On `false` the old edge is restored. On `true` it stays deleted and the
/// caller must link the replacement.
pub(crate) fn detach_if_acyclic(
    lct: &mut LinkCutTree,
    tree: &TreeState,
    source: usize,
    target: usize,
) -> bool {
    let current = tree.parent[target];
    lct.delete(current, target);
    if lct.connected(source, target) {
        lct.link(current, target);
        false
    } else {
        true
    }
}

/// Like [`detach_if_acyclic`] but always restores the old edge.
pub(crate) fn is_acyclic_reroute(
    lct: &mut LinkCutTree,
    tree: &TreeState,
    source: usize,
    target: usize,
) -> bool {
    let acyclic = detach_if_acyclic(lct, tree, source, target);
    if acyclic {
        lct.link(tree.parent[target], target);
    }
    acyclic
}
