//! Progress reporting and cooperative cancellation.
//!
//! Both collaborators are optional: headless callers use
//! [`NullProgressTracker`] and [`RunningForever`].

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use tracing::info;

use crate::{Result, error::SteinerError};

/// Receives coarse-grained phase notifications and per-unit progress.
pub trait ProgressTracker: Sync {
    /// Marks the start of a named phase.
    fn begin_subtask(&self, name: &str, volume: usize);

    /// Records `units` of completed work for the current phase.
    fn log_progress(&self, units: usize);

    /// Marks the end of a named phase.
    fn end_subtask(&self, name: &str);
}

/// Tracker that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullProgressTracker;

impl ProgressTracker for NullProgressTracker {
    fn begin_subtask(&self, _name: &str, _volume: usize) {}

    fn log_progress(&self, _units: usize) {}

    fn end_subtask(&self, _name: &str) {}
}

/// Tracker that reports phase progress as `tracing` events.
///
/// An event is emitted whenever completed work crosses another tenth of the
/// declared volume.
#[derive(Debug, Default)]
pub struct LoggingProgressTracker {
    volume: AtomicUsize,
    done: AtomicUsize,
}

impl LoggingProgressTracker {
    /// Creates a tracker with no active phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the units of work recorded for the current phase.
    #[must_use]
    pub fn completed(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl ProgressTracker for LoggingProgressTracker {
    fn begin_subtask(&self, name: &str, volume: usize) {
        self.volume.store(volume, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        info!(phase = name, volume, "phase started");
    }

    fn log_progress(&self, units: usize) {
        let before = self.done.fetch_add(units, Ordering::Relaxed);
        let volume = self.volume.load(Ordering::Relaxed);
        if volume == 0 {
            return;
        }
        let after = before + units;
        if before * 10 / volume != after * 10 / volume {
            let percent = (after.min(volume) * 100) / volume;
            info!(percent, completed = after, volume, "progress");
        }
    }

    fn end_subtask(&self, name: &str) {
        info!(phase = name, completed = self.completed(), "phase finished");
    }
}

/// Cooperative cancellation check polled between major loop iterations.
pub trait TerminationFlag: Sync {
    /// Returns `false` once the computation should stop.
    fn running(&self) -> bool;

    /// Converts a stop request into [`SteinerError::Cancelled`].
    ///
    /// # Errors
    /// Returns [`SteinerError::Cancelled`] when [`TerminationFlag::running`]
    /// reports `false`.
    fn assert_running(&self) -> Result<()> {
        if self.running() {
            Ok(())
        } else {
            Err(SteinerError::Cancelled)
        }
    }
}

/// Termination flag that never requests a stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningForever;

impl TerminationFlag for RunningForever {
    #[rustfmt::skip]
    fn running(&self) -> bool { true }
}

/// Shared flag that stops a running computation once cancelled.
///
/// # Examples
/// ```
/// use steiner_core::{CancellationToken, TerminationFlag};
///
/// let token = CancellationToken::new();
/// let handle = token.clone();
/// assert!(token.running());
/// handle.cancel();
/// assert!(!token.running());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Creates a token in the running state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests that every computation observing this token stops.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}

impl TerminationFlag for CancellationToken {
    fn running(&self) -> bool {
        !self.cancelled.load(Ordering::Acquire)
    }
}
