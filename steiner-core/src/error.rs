//! Error types for the Steiner tree core library.
//!
//! Defines error enums exposed by the public API and a convenient result alias.
//! Broken internal invariants (for example deleting a link-cut edge that does
//! not exist) are not represented here: they panic at the call site.

use std::fmt;

use thiserror::Error;

use crate::builder::ReroutingStrategy;

macro_rules! define_error_codes {
    (
        $(#[$enum_meta:meta])*
        enum $CodeTy:ident for $ErrTy:ident {
            $(
                $(#[$variant_meta:meta])*
                $CodeVariant:ident => $ErrVariant:ident $( { $($pattern:tt)* } )? => $code:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$enum_meta])*
        #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
        #[non_exhaustive]
        pub enum $CodeTy {
            $(
                $(#[$variant_meta])*
                $CodeVariant,
            )+
        }

        impl $CodeTy {
            /// Return the stable machine-readable representation of this error code.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$CodeVariant => $code,)+
                }
            }
        }

        impl fmt::Display for $CodeTy {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $ErrTy {
            #[doc = concat!(
                "Retrieve the stable [`",
                stringify!($CodeTy),
                "`] for this error."
            )]
            pub const fn code(&self) -> $CodeTy {
                match self {
                    $(Self::$ErrVariant $( { $($pattern)* } )? => $CodeTy::$CodeVariant,)+
                }
            }
        }
    };
}

/// An error produced while assembling a [`crate::CsrGraph`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GraphError {
    /// An edge referenced a node id that is not present in the graph.
    #[error("edge references node {node}, but node_count is {node_count}")]
    NodeOutOfBounds {
        /// The invalid node id referenced by an edge.
        node: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// An edge carried a NaN or infinite weight.
    #[error("edge ({source_node}, {target_node}) has non-finite weight")]
    NonFiniteWeight {
        /// Source endpoint of the offending edge.
        source_node: usize,
        /// Target endpoint of the offending edge.
        target_node: usize,
    },
    /// An edge carried a negative weight.
    #[error("edge ({source_node}, {target_node}) has negative weight {weight}")]
    NegativeWeight {
        /// Source endpoint of the offending edge.
        source_node: usize,
        /// Target endpoint of the offending edge.
        target_node: usize,
        /// The rejected weight.
        weight: f64,
    },
}

define_error_codes! {
    /// Stable codes describing [`GraphError`] variants.
    enum GraphErrorCode for GraphError {
        /// An edge referenced a node id that is not present in the graph.
        NodeOutOfBounds => NodeOutOfBounds { .. } => "GRAPH_NODE_OUT_OF_BOUNDS",
        /// An edge carried a NaN or infinite weight.
        NonFiniteWeight => NonFiniteWeight { .. } => "GRAPH_NON_FINITE_WEIGHT",
        /// An edge carried a negative weight.
        NegativeWeight => NegativeWeight { .. } => "GRAPH_NEGATIVE_WEIGHT",
    }
}

/// Error type produced when configuring or running [`crate::SteinerTree`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SteinerError {
    /// Worker count must be greater than zero.
    #[error("concurrency must be at least 1 (got {got})")]
    InvalidConcurrency {
        /// The rejected worker count.
        got: usize,
    },
    /// Bucket width must be a finite, strictly positive number.
    #[error("delta must be finite and greater than zero (got {got})")]
    InvalidDelta {
        /// The rejected bucket width.
        got: f64,
    },
    /// The local bucket threshold must be greater than zero.
    #[error("bin_size_threshold must be at least 1 (got {got})")]
    InvalidBinSizeThreshold {
        /// The rejected threshold.
        got: usize,
    },
    /// No terminal nodes were supplied.
    #[error("at least one terminal node is required")]
    NoTerminals,
    /// The graph contains no nodes.
    #[error("graph contains no nodes")]
    EmptyGraph,
    /// The source node id is not present in the graph.
    #[error("source node {source_node} is out of range for {node_count} nodes")]
    SourceOutOfBounds {
        /// The configured source node.
        source_node: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// A terminal node id is not present in the graph.
    #[error("terminal node {terminal} is out of range for {node_count} nodes")]
    TerminalOutOfBounds {
        /// The offending terminal id.
        terminal: usize,
        /// The number of nodes in the graph.
        node_count: usize,
    },
    /// The requested rerouting strategy cannot run on the supplied graph.
    #[error("rerouting strategy {requested:?} requires {requirement}")]
    StrategyUnavailable {
        /// Strategy requested by the caller.
        requested: ReroutingStrategy,
        /// Human-readable description of the missing graph capability.
        requirement: &'static str,
    },
    /// The worker pool for the shortest-path engine could not be created.
    #[error("failed to build worker pool: {message}")]
    WorkerPool {
        /// Message reported by the thread-pool builder.
        message: String,
    },
    /// The computation was cancelled through its termination flag.
    #[error("computation was cancelled")]
    Cancelled,
}

define_error_codes! {
    /// Stable codes describing [`SteinerError`] variants.
    enum SteinerErrorCode for SteinerError {
        /// Worker count must be greater than zero.
        InvalidConcurrency => InvalidConcurrency { .. } => "STEINER_INVALID_CONCURRENCY",
        /// Bucket width must be finite and strictly positive.
        InvalidDelta => InvalidDelta { .. } => "STEINER_INVALID_DELTA",
        /// The local bucket threshold must be greater than zero.
        InvalidBinSizeThreshold => InvalidBinSizeThreshold { .. } => "STEINER_INVALID_BIN_SIZE_THRESHOLD",
        /// No terminal nodes were supplied.
        NoTerminals => NoTerminals => "STEINER_NO_TERMINALS",
        /// The graph contains no nodes.
        EmptyGraph => EmptyGraph => "STEINER_EMPTY_GRAPH",
        /// The source node id is not present in the graph.
        SourceOutOfBounds => SourceOutOfBounds { .. } => "STEINER_SOURCE_OUT_OF_BOUNDS",
        /// A terminal node id is not present in the graph.
        TerminalOutOfBounds => TerminalOutOfBounds { .. } => "STEINER_TERMINAL_OUT_OF_BOUNDS",
        /// The requested rerouting strategy cannot run on the supplied graph.
        StrategyUnavailable => StrategyUnavailable { .. } => "STEINER_STRATEGY_UNAVAILABLE",
        /// The worker pool could not be created.
        WorkerPool => WorkerPool { .. } => "STEINER_WORKER_POOL",
        /// The computation was cancelled.
        Cancelled => Cancelled => "STEINER_CANCELLED",
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, SteinerError>;
