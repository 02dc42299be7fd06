//! Shared tentative distances with predecessors.
//!
//! A distance and its predecessor are always updated together: a writer
//! first claims the predecessor slot by swapping in [`LOCKED`], then
//! exchanges the distance, and finally publishes either the new or the
//! restored predecessor.

use std::{
    hint,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

/// Predecessor of nodes that were never reached.
pub(crate) const NO_PREDECESSOR: usize = usize::MAX;

const LOCKED: usize = usize::MAX - 1;

#[derive(Debug)]
pub(crate) struct TentativeDistances {
    distances: Vec<AtomicU64>,
    predecessors: Vec<AtomicUsize>,
}

impl TentativeDistances {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            distances: (0..node_count)
                .map(|_| AtomicU64::new(f64::INFINITY.to_bits()))
                .collect(),
            predecessors: (0..node_count)
                .map(|_| AtomicUsize::new(NO_PREDECESSOR))
                .collect(),
        }
    }

    #[rustfmt::skip]
    pub(crate) fn distance(&self, node: usize) -> f64 { f64::from_bits(self.distances[node].load(Ordering::Acquire)) }

    pub(crate) fn predecessor(&self, node: usize) -> usize {
        loop {
            let predecessor = self.predecessors[node].load(Ordering::Acquire);
            if predecessor != LOCKED {
                return predecessor;
            }
            hint::spin_loop();
        }
    }

    /// Overwrites both values. Only called while no relax phase is running.
    pub(crate) fn set(&self, node: usize, predecessor: usize, distance: f64) {
        self.distances[node].store(distance.to_bits(), Ordering::Release);
        self.predecessors[node].store(predecessor, Ordering::Release);
    }

    /// Replaces the distance of `node` with `new` if it still equals
    /// `expected`, recording `predecessor` on success.
    ///
    /// Returns `Ok(expected)` on success and `Err(actual)` otherwise, in the
    /// manner of the standard atomic exchange operations.
    pub(crate) fn compare_exchange(
        &self,
        node: usize,
        expected: f64,
        new: f64,
        predecessor: usize,
    ) -> Result<f64, f64> {
        let slot = &self.predecessors[node];
        let previous = loop {
            let current = slot.load(Ordering::Acquire);
            if current == LOCKED {
                hint::spin_loop();
                continue;
            }
            if slot
                .compare_exchange_weak(current, LOCKED, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                break current;
            }
        };

        let outcome = self.distances[node].compare_exchange(
            expected.to_bits(),
            new.to_bits(),
            Ordering::AcqRel,
            Ordering::Acquire,
        );
        match outcome {
            Ok(bits) => {
                slot.store(predecessor, Ordering::Release);
                Ok(f64::from_bits(bits))
            }
            Err(bits) => {
                slot.store(previous, Ordering::Release);
                Err(f64::from_bits(bits))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rayon::prelude::*;

    use super::*;

    #[test]
    fn unreached_nodes_are_infinite() {
        let distances = TentativeDistances::new(2);
        assert_eq!(distances.distance(1), f64::INFINITY);
        assert_eq!(distances.predecessor(1), NO_PREDECESSOR);
    }

    #[test]
    fn exchange_updates_distance_and_predecessor_together() {
        let distances = TentativeDistances::new(3);
        distances.set(0, NO_PREDECESSOR, 0.0);

        assert_eq!(distances.compare_exchange(2, f64::INFINITY, 4.0, 0), Ok(f64::INFINITY));
        assert_eq!(distances.predecessor(2), 0);

        assert_eq!(distances.compare_exchange(2, f64::INFINITY, 1.0, 1), Err(4.0));
        assert_eq!(distances.distance(2), 4.0);
        assert_eq!(distances.predecessor(2), 0);
    }

    #[test]
    fn concurrent_improvements_keep_the_minimum() {
        let distances = TentativeDistances::new(1);
        (0..512_usize).into_par_iter().for_each(|writer| {
            let candidate = 1000.0 - writer as f64;
            let mut current = distances.distance(0);
            while candidate < current {
                match distances.compare_exchange(0, current, candidate, writer) {
                    Ok(_) => break,
                    Err(actual) => current = actual,
                }
            }
        });
        assert_eq!(distances.distance(0), 1000.0 - 511.0);
        assert_eq!(distances.predecessor(0), 511);
    }
}
