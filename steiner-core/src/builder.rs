//! Builder utilities for configuring Steiner tree runs.
//!
//! Exposes the rerouting strategy selection surface and the validation
//! applied before constructing [`SteinerTree`] instances.

use std::{num::NonZeroUsize, thread};

use crate::{Result, error::SteinerError, steiner::SteinerTree};

/// Selects which rerouting pass improves the initial tree.
///
/// `Auto` inspects the graph once: directed graphs with an inverse index use
/// [`ReroutingStrategy::InverseIndexed`], everything else falls back to
/// [`ReroutingStrategy::ForwardScan`].
///
/// # Examples
/// ```
/// use steiner_core::ReroutingStrategy;
///
/// let strategy = ReroutingStrategy::default();
/// assert_eq!(strategy, ReroutingStrategy::Auto);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReroutingStrategy {
    /// Let the library choose from the graph's capabilities.
    #[default]
    Auto,
    /// Scan every outgoing relationship of every tree node.
    ForwardScan,
    /// Replay discovered paths over incoming relationships, ordered by gain.
    InverseIndexed,
    /// Replay the whole discovery queue over incoming relationships, or over
    /// outgoing relationships of an undirected graph.
    Extended,
}

/// Configures and constructs [`SteinerTree`] instances.
///
/// # Examples
/// ```
/// use steiner_core::{ReroutingStrategy, SteinerTreeBuilder};
///
/// let steiner = SteinerTreeBuilder::new(0)
///     .with_terminals([3, 5])
///     .with_delta(1.5)
///     .with_rerouting(true)
///     .with_rerouting_strategy(ReroutingStrategy::ForwardScan)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(steiner.terminals(), &[3, 5]);
/// assert!(steiner.rerouting());
/// ```
#[derive(Debug, Clone)]
pub struct SteinerTreeBuilder {
    source: usize,
    terminals: Vec<usize>,
    delta: f64,
    concurrency: usize,
    rerouting: bool,
    strategy: ReroutingStrategy,
    bin_size_threshold: usize,
}

impl SteinerTreeBuilder {
    /// Creates a builder rooted at `source` with default parameters.
    ///
    /// # Examples
    /// ```
    /// use steiner_core::{ReroutingStrategy, SteinerTreeBuilder};
    ///
    /// let builder = SteinerTreeBuilder::new(7);
    /// assert_eq!(builder.source(), 7);
    /// assert_eq!(builder.delta(), 2.0);
    /// assert_eq!(builder.bin_size_threshold(), 1000);
    /// assert!(!builder.rerouting());
    /// assert_eq!(builder.rerouting_strategy(), ReroutingStrategy::Auto);
    /// ```
    #[must_use]
    pub fn new(source: usize) -> Self {
        Self {
            source,
            terminals: Vec::new(),
            delta: 2.0,
            concurrency: thread::available_parallelism().map_or(1, NonZeroUsize::get),
            rerouting: false,
            strategy: ReroutingStrategy::Auto,
            bin_size_threshold: 1000,
        }
    }

    /// Replaces the terminal set.
    #[must_use]
    pub fn with_terminals<I>(mut self, terminals: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        self.terminals = terminals.into_iter().collect();
        self
    }

    /// Overrides the bucket width of the shortest-path search.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    /// Overrides the number of shortest-path workers.
    ///
    /// # Examples
    /// ```
    /// use steiner_core::SteinerTreeBuilder;
    ///
    /// let builder = SteinerTreeBuilder::new(0).with_concurrency(3);
    /// assert_eq!(builder.concurrency(), 3);
    /// ```
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Enables or disables the rerouting pass.
    #[must_use]
    pub fn with_rerouting(mut self, enabled: bool) -> Self {
        self.rerouting = enabled;
        self
    }

    /// Selects the rerouting variant used when rerouting is enabled.
    #[must_use]
    pub fn with_rerouting_strategy(mut self, strategy: ReroutingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Overrides the local bucket size above which a worker stops draining
    /// its own bucket and defers to the shared frontier.
    #[must_use]
    pub fn with_bin_size_threshold(mut self, threshold: usize) -> Self {
        self.bin_size_threshold = threshold;
        self
    }

    /// Returns the configured source node.
    #[must_use]
    #[rustfmt::skip]
    pub fn source(&self) -> usize { self.source }

    /// Returns the configured terminals in insertion order.
    #[must_use]
    #[rustfmt::skip]
    pub fn terminals(&self) -> &[usize] { &self.terminals }

    /// Returns the configured bucket width.
    #[must_use]
    #[rustfmt::skip]
    pub fn delta(&self) -> f64 { self.delta }

    /// Returns the configured worker count.
    #[must_use]
    #[rustfmt::skip]
    pub fn concurrency(&self) -> usize { self.concurrency }

    /// Returns whether rerouting is enabled.
    #[must_use]
    #[rustfmt::skip]
    pub fn rerouting(&self) -> bool { self.rerouting }

    /// Returns the configured rerouting variant.
    #[must_use]
    #[rustfmt::skip]
    pub fn rerouting_strategy(&self) -> ReroutingStrategy { self.strategy }

    /// Returns the configured local bucket threshold.
    #[must_use]
    #[rustfmt::skip]
    pub fn bin_size_threshold(&self) -> usize { self.bin_size_threshold }

    /// Validates the configuration and constructs a [`SteinerTree`].
    ///
    /// Terminals are sorted and deduplicated. Graph-dependent checks happen
    /// in [`SteinerTree::run`].
    ///
    /// # Errors
    /// Returns [`SteinerError::InvalidConcurrency`] for a zero worker count,
    /// [`SteinerError::InvalidDelta`] for a non-finite or non-positive delta,
    /// [`SteinerError::InvalidBinSizeThreshold`] for a zero threshold and
    /// [`SteinerError::NoTerminals`] when no terminal was supplied.
    ///
    /// # Examples
    /// ```
    /// use steiner_core::{SteinerError, SteinerTreeBuilder};
    ///
    /// let err = SteinerTreeBuilder::new(0)
    ///     .with_terminals([1])
    ///     .with_delta(0.0)
    ///     .build()
    ///     .expect_err("zero delta is rejected");
    /// assert_eq!(err, SteinerError::InvalidDelta { got: 0.0 });
    /// ```
    pub fn build(self) -> Result<SteinerTree> {
        let concurrency = NonZeroUsize::new(self.concurrency).ok_or(
            SteinerError::InvalidConcurrency {
                got: self.concurrency,
            },
        )?;
        if !self.delta.is_finite() || self.delta <= 0.0 {
            return Err(SteinerError::InvalidDelta { got: self.delta });
        }
        let bin_size_threshold = NonZeroUsize::new(self.bin_size_threshold).ok_or(
            SteinerError::InvalidBinSizeThreshold {
                got: self.bin_size_threshold,
            },
        )?;
        let mut terminals = self.terminals;
        if terminals.is_empty() {
            return Err(SteinerError::NoTerminals);
        }
        terminals.sort_unstable();
        terminals.dedup();

        Ok(SteinerTree::new(
            self.source,
            terminals,
            self.delta,
            concurrency,
            self.rerouting.then_some(self.strategy),
            bin_size_threshold,
        ))
    }
}
