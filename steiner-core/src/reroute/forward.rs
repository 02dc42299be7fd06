//! Forward-scan rerouting: one sweep over every outgoing relationship of
//! every tree node, followed by a reachability prune.

use bitvec::{bitvec, slice::BitSlice};
use tracing::{debug, trace};

use crate::{
    Result,
    graph::Graph,
    link_cut::LinkCutTree,
    progress::{ProgressTracker, TerminationFlag},
    tree::{ROOT_NODE, TreeState, TreeTotals},
};

use super::{DEFAULT_WEIGHT, RerouteContext, RerouteStats, detach_if_acyclic};

pub(super) fn reroute<G, P, T>(
    ctx: &RerouteContext<'_, G, P, T>,
    tree: &mut TreeState,
    totals: &TreeTotals,
) -> Result<RerouteStats>
where
    G: Graph,
    P: ProgressTracker + ?Sized,
    T: TerminationFlag + ?Sized,
{
    let mut lct = LinkCutTree::from_tree(tree);
    let mut stats = RerouteStats::default();

    for source in 0..tree.node_count() {
        ctx.termination.assert_running()?;
        ctx.progress.log_progress(1);
        if !tree.is_live(source) {
            continue;
        }
        ctx.graph
            .for_each_relationship(source, DEFAULT_WEIGHT, |_, target, weight| {
                let parent = tree.parent[target];
                if target == source || !tree.is_live(target) || parent == ROOT_NODE {
                    return true;
                }
                if parent == source || tree.parent_cost[target] <= weight {
                    return true;
                }
                if detach_if_acyclic(&mut lct, tree, source, target) {
                    let saving = tree.parent_cost[target] - weight;
                    lct.link(source, target);
                    tree.set_parent(target, source, weight);
                    totals.subtract_cost(saving);
                    stats.applied += 1;
                    debug!(node = target, from = parent, to = source, saving, "rerouted");
                } else {
                    stats.rejected += 1;
                    trace!(node = target, candidate = source, "reroute would close a cycle");
                }
                true
            });
    }

    stats.pruned = prune_unreachable(ctx.terminals, tree, totals);
    Ok(stats)
}

/// Prunes every live node that no live terminal reaches through its parent
/// chain. Returns the number of pruned nodes.
fn prune_unreachable(
    terminals: &BitSlice,
    tree: &mut TreeState,
    totals: &TreeTotals,
) -> usize {
    let mut reached = bitvec![0; tree.node_count()];
    reached.set(tree.source, true);
    for terminal in terminals.iter_ones() {
        if !tree.is_live(terminal) {
            continue;
        }
        let mut node = terminal;
        while !reached.replace(node, true) {
            node = tree.parent[node];
        }
    }

    let mut pruned = 0;
    for node in 0..tree.node_count() {
        if tree.is_live(node) && !reached[node] {
            totals.subtract_cost(tree.prune(node));
            totals.node_pruned();
            pruned += 1;
        }
    }
    pruned
}
