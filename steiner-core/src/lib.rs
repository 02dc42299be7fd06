//! Steiner core library.
//!
//! Approximates directed Steiner trees: a delta-stepping search connects the
//! terminals to a source one shortest path at a time, and an optional
//! rerouting pass replaces expensive tree edges with cheaper ones.
#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod delta;
mod error;
mod graph;
mod initial_tree;
mod link_cut;
mod progress;
mod reroute;
mod result;
mod sibling_tree;
mod steiner;
mod tree;

#[cfg(test)]
mod test_utils;

pub use crate::{
    builder::{ReroutingStrategy, SteinerTreeBuilder},
    error::{GraphError, GraphErrorCode, Result, SteinerError, SteinerErrorCode},
    graph::{CsrGraph, Graph, GraphBuilder, Orientation},
    link_cut::LinkCutTree,
    progress::{
        CancellationToken, LoggingProgressTracker, NullProgressTracker, ProgressTracker,
        RunningForever, TerminationFlag,
    },
    result::{ParentLink, SteinerTreeResult},
    steiner::SteinerTree,
    tree::{PRUNED, PRUNED_COST, ROOT_NODE},
};
