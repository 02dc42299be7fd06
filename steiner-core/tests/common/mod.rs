//! Graph fixtures and collaborators shared by the integration tests.

use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

use steiner_core::{CsrGraph, GraphBuilder, ProgressTracker};

/// Builds a directed graph, optionally with an inverse index.
pub fn directed(node_count: usize, inverse: bool, edges: &[(usize, usize, f64)]) -> CsrGraph {
    GraphBuilder::new(node_count)
        .with_inverse_index(inverse)
        .with_edges(edges.iter().map(|&(s, t, w)| (s, t, Some(w))))
        .build()
        .expect("fixture edges are valid")
}

/// A three-hop chain to node 3 that a zero-cost edge from terminal 4 can
/// replace. Node 5 is isolated.
pub fn shortcut(inverse: bool) -> CsrGraph {
    directed(
        6,
        inverse,
        &[(0, 1, 1.0), (0, 4, 4.0), (1, 2, 1.0), (2, 3, 1.0), (4, 3, 0.0)],
    )
}

/// A chain 0 -> 1 -> 2 -> 3 with a back edge 3 -> 1.
pub fn back_edge(inverse: bool) -> CsrGraph {
    directed(4, inverse, &[(0, 1, 1.0), (1, 2, 1.0), (2, 3, 1.0), (3, 1, 0.5)])
}

/// Two expensive branches that can each absorb part of the cheap chain.
pub fn two_reroutes(inverse: bool) -> CsrGraph {
    directed(
        8,
        inverse,
        &[
            (0, 1, 1.0),
            (0, 4, 10.0),
            (0, 7, 10.0),
            (1, 2, 1.0),
            (2, 3, 1.0),
            (4, 3, 1.0),
            (3, 5, 1.0),
            (5, 6, 1.0),
            (4, 6, 1.0),
        ],
    )
}

/// A fork at node 1 that keeps it alive after the branch to 3 moves away.
pub fn cross_road(inverse: bool) -> CsrGraph {
    directed(
        7,
        inverse,
        &[
            (0, 1, 10.0),
            (0, 6, 100.0),
            (1, 2, 10.0),
            (1, 4, 20.0),
            (2, 3, 10.0),
            (4, 5, 20.0),
            (6, 3, 1.0),
        ],
    )
}

/// Six nodes where one reroute turns node 2 into a single parent.
pub fn single_parent() -> CsrGraph {
    directed(
        6,
        true,
        &[
            (0, 5, 10.0),
            (0, 1, 1.0),
            (0, 4, 7.0),
            (1, 2, 1.0),
            (2, 3, 4.0),
            (2, 4, 6.0),
            (5, 3, 3.0),
        ],
    )
}

/// Progress tracker that remembers every notification.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    phases: Mutex<Vec<(String, usize)>>,
    finished: Mutex<Vec<(String, usize)>>,
    units: AtomicUsize,
}

impl RecordingProgress {
    /// Started phases with their declared volume.
    pub fn phases(&self) -> Vec<(String, usize)> {
        self.phases.lock().expect("lock poisoned").clone()
    }

    /// Finished phases with the units logged while they ran.
    pub fn finished(&self) -> Vec<(String, usize)> {
        self.finished.lock().expect("lock poisoned").clone()
    }
}

impl ProgressTracker for RecordingProgress {
    fn begin_subtask(&self, name: &str, volume: usize) {
        self.units.store(0, Ordering::Relaxed);
        self.phases
            .lock()
            .expect("lock poisoned")
            .push((name.to_owned(), volume));
    }

    fn log_progress(&self, units: usize) {
        self.units.fetch_add(units, Ordering::Relaxed);
    }

    fn end_subtask(&self, name: &str) {
        self.finished
            .lock()
            .expect("lock poisoned")
            .push((name.to_owned(), self.units.load(Ordering::Relaxed)));
    }
}
