//! Gain-ordered rerouting over the nodes discovered by the path engine.
//!
//! A scan records, for every discovered node, the cheapest acyclic
//! alternative parent reachable through an incoming edge together with the
//! net gain of switching to it: the cost of the chain of single-child,
//! non-terminal ancestors that would become useless, minus the new edge.
//! Candidates are then applied from the largest gain down, recomputing each
//! gain against the tree as it stands.

use std::{cmp::Ordering, collections::BinaryHeap};

use tracing::{debug, trace};

use crate::{
    Result,
    graph::Graph,
    link_cut::LinkCutTree,
    progress::{ProgressTracker, TerminationFlag},
    sibling_tree::SiblingTree,
    tree::{PRUNED, TreeState, TreeTotals},
};

use super::{DEFAULT_WEIGHT, RerouteContext, RerouteStats, detach_if_acyclic, is_acyclic_reroute};

/// How the discovery queue is replayed during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Traversal {
    /// Each discovered path separately, bottom-up, over inverse adjacency.
    Segments,
    /// The whole queue in discovery order, ignoring path boundaries.
    Queue,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    net_gain: f64,
    node: usize,
    parent: usize,
    weight: f64,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    // Largest gain first, lower node id first on ties.
    fn cmp(&self, other: &Self) -> Ordering {
        self.net_gain
            .total_cmp(&other.net_gain)
            .then_with(|| other.node.cmp(&self.node))
            .then_with(|| other.parent.cmp(&self.parent))
    }
}

struct Rerouting<'t, 'c, G, P: ?Sized, T: ?Sized> {
    ctx: &'c RerouteContext<'c, G, P, T>,
    tree: &'t mut TreeState,
    totals: &'t TreeTotals,
    lct: LinkCutTree,
    siblings: SiblingTree<'c>,
    gain: Vec<Option<f64>>,
    // Incoming relationships come from the forward index on undirected graphs.
    use_forward: bool,
    stats: RerouteStats,
}

pub(super) fn reroute<G, P, T>(
    ctx: &RerouteContext<'_, G, P, T>,
    tree: &mut TreeState,
    totals: &TreeTotals,
    traversal: Traversal,
) -> Result<RerouteStats>
where
    G: Graph,
    P: ProgressTracker + ?Sized,
    T: TerminationFlag + ?Sized,
{
    let use_forward = traversal == Traversal::Queue
        && !ctx.graph.is_inverse_indexed()
        && ctx.graph.is_undirected();
    let mut run = Rerouting {
        lct: LinkCutTree::from_tree(tree),
        siblings: SiblingTree::from_tree(tree, ctx.terminals),
        gain: vec![None; tree.node_count()],
        ctx,
        tree,
        totals,
        use_forward,
        stats: RerouteStats::default(),
    };

    let mut heap = BinaryHeap::new();
    match traversal {
        Traversal::Segments => {
            for segment in ctx.discovery.split(|&node| node == PRUNED) {
                for &node in segment.iter().rev() {
                    ctx.termination.assert_running()?;
                    ctx.progress.log_progress(1);
                    heap.extend(run.best_candidate(node));
                }
            }
        }
        Traversal::Queue => {
            for &node in ctx.discovery.iter().filter(|&&node| node != PRUNED) {
                ctx.termination.assert_running()?;
                ctx.progress.log_progress(1);
                heap.extend(run.best_candidate(node));
            }
        }
    }

    while let Some(candidate) = heap.pop() {
        ctx.termination.assert_running()?;
        run.apply(candidate);
    }
    Ok(run.stats)
}

impl<G, P, T> Rerouting<'_, '_, G, P, T>
where
    G: Graph,
    P: ProgressTracker + ?Sized,
    T: TerminationFlag + ?Sized,
{
    /// Cost released by detaching `node`: its own edge plus the edges of every
    /// prunable ancestor above it, stopping below the source.
    fn pruning_gain(&mut self, node: usize) -> f64 {
        let mut chain = Vec::new();
        let mut base = 0.0;
        let mut current = node;
        loop {
            if let Some(known) = self.gain[current] {
                base = known;
                break;
            }
            chain.push(current);
            let parent = self.tree.parent[current];
            if parent == self.tree.source || !self.siblings.prunable(parent) {
                break;
            }
            current = parent;
        }
        for &link in chain.iter().rev() {
            base += self.tree.parent_cost[link];
            self.gain[link] = Some(base);
        }
        base
    }

    fn incoming<F>(&self, node: usize, visitor: F)
    where
        F: FnMut(usize, usize, f64) -> bool,
    {
        if self.use_forward {
            self.ctx
                .graph
                .for_each_relationship(node, DEFAULT_WEIGHT, visitor);
        } else {
            self.ctx
                .graph
                .for_each_inverse_relationship(node, DEFAULT_WEIGHT, visitor);
        }
    }

    /// Cheapest acyclic alternative parent of `node`, if any.
    fn best_candidate(&mut self, node: usize) -> Option<Candidate> {
        if !self.tree.is_live(node) {
            return None;
        }
        let gain = self.pruning_gain(node);
        let current_parent = self.tree.parent[node];

        let mut options = Vec::new();
        self.incoming(node, |_, neighbour, weight| {
            options.push((neighbour, weight));
            true
        });

        let mut best: Option<(usize, f64)> = None;
        for (neighbour, weight) in options {
            if neighbour == node || neighbour == current_parent || !self.tree.is_live(neighbour) {
                continue;
            }
            if best.is_some_and(|(_, best_weight)| best_weight <= weight) {
                continue;
            }
            if is_acyclic_reroute(&mut self.lct, self.tree, neighbour, node) {
                best = Some((neighbour, weight));
            } else {
                self.stats.rejected += 1;
                trace!(node, candidate = neighbour, "reroute would close a cycle");
            }
        }

        best.map(|(parent, weight)| Candidate {
            net_gain: gain - weight,
            node,
            parent,
            weight,
        })
    }

    /// Gain of detaching `node` against the current tree, not counting the
    /// chain above `new_parent`.
    fn current_gain(&self, node: usize, new_parent: usize) -> f64 {
        let mut gain = self.tree.parent_cost[node];
        let mut ancestor = self.tree.parent[node];
        while ancestor != self.tree.source
            && ancestor != new_parent
            && !self.siblings.is_terminal(ancestor)
            && self.siblings.has_single_child(ancestor)
        {
            gain += self.tree.parent_cost[ancestor];
            ancestor = self.tree.parent[ancestor];
        }
        gain
    }

    fn apply(&mut self, candidate: Candidate) {
        let Candidate {
            node,
            parent: new_parent,
            weight,
            ..
        } = candidate;
        if !self.tree.is_live(node)
            || !self.tree.is_live(new_parent)
            || self.tree.parent[node] == new_parent
        {
            return;
        }

        let net_gain = self.current_gain(node, new_parent) - weight;
        if net_gain <= 0.0 {
            trace!(node, candidate = new_parent, net_gain, "reroute no longer pays off");
            self.stats.rejected += 1;
            return;
        }
        if !detach_if_acyclic(&mut self.lct, self.tree, new_parent, node) {
            trace!(node, candidate = new_parent, "reroute would close a cycle");
            self.stats.rejected += 1;
            return;
        }

        let old_parent = self.tree.parent[node];
        let old_cost = self.tree.parent_cost[node];
        self.lct.link(new_parent, node);
        self.siblings.cut(node, old_parent);
        self.siblings.link(node, new_parent);
        self.tree.set_parent(node, new_parent, weight);
        self.totals.subtract_cost(old_cost - weight);
        self.stats.applied += 1;
        debug!(node, from = old_parent, to = new_parent, net_gain, "rerouted");

        self.prune_upwards(old_parent);
    }

    /// Removes `node` and its ancestors while they are childless
    /// non-terminals.
    fn prune_upwards(&mut self, mut node: usize) {
        while node != self.tree.source
            && !self.siblings.is_terminal(node)
            && !self.siblings.has_children(node)
        {
            let parent = self.tree.parent[node];
            self.lct.delete(parent, node);
            self.siblings.cut(node, parent);
            self.totals.subtract_cost(self.tree.prune(node));
            self.totals.node_pruned();
            self.stats.pruned += 1;
            node = parent;
        }
    }
}
