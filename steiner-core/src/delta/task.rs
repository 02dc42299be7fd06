//! Per-worker relaxation state for the delta-stepping engine.

use std::{
    mem,
    sync::atomic::{AtomicUsize, Ordering},
};

use bitvec::slice::BitSlice;

use crate::graph::Graph;

use super::{NO_BIN, distances::TentativeDistances};

/// Number of frontier slots claimed per atomic increment.
const BATCH_SIZE: usize = 64;

/// Weight assumed for relationships stored without one.
const DEFAULT_WEIGHT: f64 = 1.0;

/// Read-only view shared by every worker during one relax phase.
pub(super) struct RelaxRound<'a, G> {
    pub(super) graph: &'a G,
    pub(super) frontier: &'a [AtomicUsize],
    pub(super) frontier_len: usize,
    pub(super) claim: &'a AtomicUsize,
    pub(super) distances: &'a TentativeDistances,
    pub(super) merged: &'a BitSlice,
    pub(super) delta: f64,
    pub(super) bin: usize,
    pub(super) bin_size_threshold: usize,
}

/// Local buckets owned by one worker.
///
/// Bucket `i` holds nodes whose tentative distance fell in
/// `[i * delta, (i + 1) * delta)` when they were last improved. Stale entries
/// are tolerated and simply relaxed again.
#[derive(Debug, Default)]
pub(super) struct DeltaTask {
    local_bins: Vec<Vec<usize>>,
    bin_index: usize,
}

impl DeltaTask {
    pub(super) fn relax<G: Graph>(&mut self, round: &RelaxRound<'_, G>) {
        self.bin_index = round.bin;
        self.relax_global_bin(round);
        self.relax_local_bin(round);
    }

    fn relax_global_bin<G: Graph>(&mut self, round: &RelaxRound<'_, G>) {
        let lower_bound = round.delta * round.bin as f64;
        loop {
            let offset = round.claim.fetch_add(BATCH_SIZE, Ordering::AcqRel);
            if offset >= round.frontier_len {
                break;
            }
            let limit = (offset + BATCH_SIZE).min(round.frontier_len);
            for slot in &round.frontier[offset..limit] {
                let node = slot.load(Ordering::Acquire);
                // Nodes improved into an earlier bucket were already handled.
                if round.distances.distance(node) >= lower_bound {
                    self.relax_node(node, round);
                }
            }
        }
    }

    fn relax_local_bin<G: Graph>(&mut self, round: &RelaxRound<'_, G>) {
        let bin = self.bin_index;
        while let Some(pending) = self.local_bins.get_mut(bin) {
            if pending.is_empty() || pending.len() >= round.bin_size_threshold {
                break;
            }
            let batch = mem::take(pending);
            for &node in &batch {
                self.relax_node(node, round);
            }
        }
    }

    fn relax_node<G: Graph>(&mut self, node: usize, round: &RelaxRound<'_, G>) {
        let base = round.distances.distance(node);
        round
            .graph
            .for_each_relationship(node, DEFAULT_WEIGHT, |source, target, weight| {
                if round.merged[target] {
                    return true;
                }
                let candidate = base + weight;
                let mut current = round.distances.distance(target);
                while candidate < current {
                    match round
                        .distances
                        .compare_exchange(target, current, candidate, source)
                    {
                        Ok(_) => {
                            self.push(target, (candidate / round.delta) as usize);
                            break;
                        }
                        Err(actual) => current = actual,
                    }
                }
                true
            });
    }

    fn push(&mut self, node: usize, bin: usize) {
        if bin >= self.local_bins.len() {
            self.local_bins.resize_with(bin + 1, Vec::new);
        }
        self.local_bins[bin].push(node);
    }

    /// Smallest non-empty local bucket at or above the current one.
    pub(super) fn min_non_empty_bin(&self) -> usize {
        self.local_bins
            .iter()
            .enumerate()
            .skip(self.bin_index)
            .find(|(_, nodes)| !nodes.is_empty())
            .map_or(NO_BIN, |(bin, _)| bin)
    }

    /// Smallest tentative distance among nodes still queued in `bin`.
    pub(super) fn smallest_considered_distance(
        &self,
        bin: usize,
        distances: &TentativeDistances,
    ) -> f64 {
        self.local_bins.get(bin).map_or(f64::INFINITY, |nodes| {
            nodes
                .iter()
                .map(|&node| distances.distance(node))
                .fold(f64::INFINITY, f64::min)
        })
    }

    pub(super) fn bin_len(&self, bin: usize) -> usize {
        self.local_bins.get(bin).map_or(0, Vec::len)
    }

    /// Moves the contents of `bin` into the shared frontier.
    pub(super) fn publish(&mut self, bin: usize, frontier: &[AtomicUsize], claim: &AtomicUsize) {
        let Some(nodes) = self.local_bins.get_mut(bin) else {
            return;
        };
        if nodes.is_empty() {
            return;
        }
        let offset = claim.fetch_add(nodes.len(), Ordering::AcqRel);
        for (slot, node) in frontier[offset..offset + nodes.len()].iter().zip(nodes.drain(..)) {
            slot.store(node, Ordering::Release);
        }
    }
}
