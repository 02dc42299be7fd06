//! Benchmark setup error type.
//!
//! Lets setup functions propagate failures with `?` instead of using
//! `.expect()`.

use crate::source::SyntheticError;
use steiner_core::{GraphError, SteinerError};

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic graph generation failed.
    #[error("synthetic graph generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// The generated edges were rejected by the graph builder.
    #[error("graph construction failed: {0}")]
    Graph(#[from] GraphError),
    /// Configuring or running the computation failed.
    #[error("steiner computation failed: {0}")]
    Steiner(#[from] SteinerError),
}
