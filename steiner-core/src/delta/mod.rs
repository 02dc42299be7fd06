//! Delta-stepping shortest paths that merge every solved path into the
//! source.
//!
//! The engine runs rounds of a relax phase followed by a sync phase on a
//! dedicated worker pool. Between rounds the driver checks whether the
//! closest unvisited terminal can no longer improve. Once accepted, the
//! terminal's path is emitted and every node on it is reset to distance zero,
//! so later terminals reach the tree rather than the bare source.

mod distances;
mod path;
mod task;


use std::sync::atomic::AtomicUsize;

use bitvec::{bitvec, vec::BitVec};
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};
use tracing::{debug, trace};

use crate::{Result, error::SteinerError, graph::Graph, progress::TerminationFlag};

use self::{
    distances::{NO_PREDECESSOR, TentativeDistances},
    task::{DeltaTask, RelaxRound},
};

pub(crate) use self::path::PathResult;

/// Marks "no bucket left to process".
pub(crate) const NO_BIN: usize = usize::MAX;

/// Parameters of one engine run.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EngineConfig {
    pub(crate) source: usize,
    pub(crate) delta: f64,
    pub(crate) concurrency: usize,
    pub(crate) bin_size_threshold: usize,
}

/// Lazy, non-restartable stream of terminal paths in discovery order.
///
/// Yields at most one path per terminal. Cancellation surfaces as a single
/// `Err(SteinerError::Cancelled)` after which the stream ends.
pub(crate) struct SteinerPaths<'a, G, T: ?Sized> {
    graph: &'a G,
    termination: &'a T,
    config: EngineConfig,
    pool: ThreadPool,
    tasks: Vec<DeltaTask>,
    frontier: Vec<AtomicUsize>,
    frontier_len: usize,
    distances: TentativeDistances,
    merged: BitVec,
    // Sorted ascending so ties resolve to the lowest id.
    unvisited: Vec<usize>,
    current_bin: usize,
    path_index: usize,
    finished: bool,
}

impl<'a, G: Graph, T: TerminationFlag + ?Sized> SteinerPaths<'a, G, T> {
    /// Prepares a run from `config.source` towards `terminals`.
    ///
    /// `terminals` must be sorted, deduplicated, in range and must not
    /// contain the source.
    ///
    /// # Errors
    /// Returns [`SteinerError::WorkerPool`] when the worker pool cannot be
    /// created.
    pub(crate) fn new(
        graph: &'a G,
        terminals: Vec<usize>,
        config: EngineConfig,
        termination: &'a T,
    ) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.concurrency)
            .thread_name(|idx| format!("steiner-delta-{idx}"))
            .build()
            .map_err(|err| SteinerError::WorkerPool {
                message: err.to_string(),
            })?;

        let node_count = graph.node_count();
        let distances = TentativeDistances::new(node_count);
        distances.set(config.source, NO_PREDECESSOR, 0.0);
        let mut merged = bitvec![0; node_count];
        merged.set(config.source, true);

        Ok(Self {
            graph,
            termination,
            config,
            pool,
            tasks: (0..config.concurrency).map(|_| DeltaTask::default()).collect(),
            frontier: vec![AtomicUsize::new(config.source)],
            frontier_len: 1,
            distances,
            merged,
            finished: terminals.is_empty(),
            unvisited: terminals,
            current_bin: 0,
            path_index: 0,
        })
    }

    fn relax_phase(&mut self) {
        let claim = AtomicUsize::new(0);
        let round = RelaxRound {
            graph: self.graph,
            frontier: &self.frontier,
            frontier_len: self.frontier_len,
            claim: &claim,
            distances: &self.distances,
            merged: &self.merged,
            delta: self.config.delta,
            bin: self.current_bin,
            bin_size_threshold: self.config.bin_size_threshold,
        };
        let tasks = &mut self.tasks;
        self.pool
            .install(|| tasks.par_iter_mut().for_each(|task| task.relax(&round)));
    }

    fn sync_phase(&mut self) {
        let bin = self.current_bin;
        let needed: usize = self.tasks.iter().map(|task| task.bin_len(bin)).sum();
        if self.frontier.len() < needed {
            self.frontier.resize_with(needed, || AtomicUsize::new(0));
        }
        let claim = AtomicUsize::new(0);
        let frontier = &self.frontier;
        let tasks = &mut self.tasks;
        self.pool.install(|| {
            tasks
                .par_iter_mut()
                .for_each(|task| task.publish(bin, frontier, &claim));
        });
        self.frontier_len = needed;
    }

    /// Closest unvisited terminal that has been reached at all.
    fn closest_terminal(&self) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        for (position, &terminal) in self.unvisited.iter().enumerate() {
            let distance = self.distances.distance(terminal);
            if distance.is_finite() && best.is_none_or(|(_, _, d)| distance < d) {
                best = Some((position, terminal, distance));
            }
        }
        best
    }

    /// Decides whether `distance` can no longer be improved by pending work.
    fn ensure_shortest(&self, distance: f64, old_bin: usize) -> bool {
        let bin = self.current_bin;
        if bin == NO_BIN {
            return true;
        }
        let delta = self.config.delta;
        if old_bin == bin {
            if distance >= (bin as f64 + 1.0) * delta {
                return false;
            }
            let closest_pending = self
                .tasks
                .iter()
                .map(|task| task.smallest_considered_distance(bin, &self.distances))
                .fold(f64::INFINITY, f64::min);
            distance <= closest_pending
        } else {
            distance < bin as f64 * delta
        }
    }

    fn accept(&mut self, position: usize, terminal: usize) -> PathResult {
        let path = PathResult::trace(self.path_index, terminal, &self.distances, &self.merged);
        self.path_index += 1;
        self.unvisited.remove(position);
        debug!(
            terminal,
            path_len = path.node_ids.len(),
            remaining = self.unvisited.len(),
            "terminal reached"
        );
        #[cfg(feature = "metrics")]
        metrics::counter!("steiner_terminals_reached").increment(1);

        if self.unvisited.is_empty() {
            self.finished = true;
        } else {
            self.merge_path_to_source(terminal);
            self.current_bin = 0;
        }
        path
    }

    /// Zeroes every node between `node` and the nearest merged ancestor and
    /// makes them the next frontier.
    fn merge_path_to_source(&mut self, node: usize) {
        self.frontier_len = 0;
        let mut current = node;
        while !self.merged.replace(current, true) {
            let predecessor = self.distances.predecessor(current);
            self.distances.set(current, predecessor, 0.0);
            if self.frontier_len < self.frontier.len() {
                *self.frontier[self.frontier_len].get_mut() = current;
            } else {
                self.frontier.push(AtomicUsize::new(current));
            }
            self.frontier_len += 1;
            current = predecessor;
        }
    }
}

impl<G: Graph, T: TerminationFlag + ?Sized> Iterator for SteinerPaths<'_, G, T> {
    type Item = Result<PathResult>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Err(err) = self.termination.assert_running() {
                self.finished = true;
                return Some(Err(err));
            }

            self.relax_phase();
            let old_bin = self.current_bin;
            self.current_bin = self
                .tasks
                .iter()
                .map(DeltaTask::min_non_empty_bin)
                .min()
                .unwrap_or(NO_BIN);

            if let Some((position, terminal, distance)) = self.closest_terminal() {
                if self.ensure_shortest(distance, old_bin) {
                    return Some(Ok(self.accept(position, terminal)));
                }
                trace!(terminal, distance, bin = self.current_bin, "terminal not settled");
            }

            if self.current_bin == NO_BIN {
                // Remaining terminals are unreachable.
                self.finished = true;
                break;
            }
            self.sync_phase();
        }
        None
    }
}
