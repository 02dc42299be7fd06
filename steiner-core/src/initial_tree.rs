//! Folds discovered terminal paths into the initial Steiner tree.

use bitvec::slice::BitSlice;
use tracing::debug;

use crate::{
    Result,
    delta::PathResult,
    progress::{ProgressTracker, TerminationFlag},
    tree::{PRUNED, TreeState, TreeTotals},
};

/// Tree produced by the shortest-path phase, before any rerouting.
#[derive(Debug)]
pub(crate) struct InitialTree {
    pub(crate) tree: TreeState,
    pub(crate) totals: TreeTotals,
    /// Newly attached nodes in discovery order, top-down per path, with a
    /// [`PRUNED`] separator after every path.
    pub(crate) discovery: Vec<usize>,
}

/// Attaches every edge of every terminal path to a tree rooted at `source`.
///
/// Paths whose target is not a terminal are ignored.
///
/// # Errors
/// Propagates the first error yielded by `paths` and returns
/// [`crate::SteinerError::Cancelled`] when `termination` stops the run
/// between paths.
pub(crate) fn build_initial_tree<I, P, T>(
    source: usize,
    node_count: usize,
    paths: I,
    terminals: &BitSlice,
    progress: &P,
    termination: &T,
) -> Result<InitialTree>
where
    I: IntoIterator<Item = Result<PathResult>>,
    P: ProgressTracker + ?Sized,
    T: TerminationFlag + ?Sized,
{
    let mut tree = TreeState::rooted_at(source, node_count);
    let totals = TreeTotals::with_source();
    let mut discovery = Vec::new();

    for path in paths {
        let path = path?;
        termination.assert_running()?;
        if !terminals[path.target] {
            debug!(target = path.target, "ignoring path to a non-terminal");
            continue;
        }
        for (parent, child, cost) in path.edges() {
            if !tree.is_live(child) {
                totals.node_attached();
                discovery.push(child);
            } else {
                totals.subtract_cost(tree.parent_cost[child]);
            }
            tree.set_parent(child, parent, cost);
            totals.add_cost(cost);
        }
        discovery.push(PRUNED);
        progress.log_progress(1);
    }

    Ok(InitialTree {
        tree,
        totals,
        discovery,
    })
}
