//! Progress notifications emitted during a run.
//!
//! The engine never prints. It reports through a [`SyncObserver`], and the
//! binary decides how events reach the user.

use std::time::Duration;

use super::PROGRESS_INTERVAL;
use super::engine::SyncTally;
use super::outcome::FailureKind;
use crate::names::Name;

/// Counts gathered before the first request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartSummary {
    /// Names in the list.
    pub total: usize,
    /// Names whose artifact is already on disk.
    pub already_downloaded: usize,
}

impl StartSummary {
    /// Names that still need a fetch.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.already_downloaded)
    }
}

/// Running counts at a progress checkpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    /// 1-based position of the name just processed.
    pub position: usize,
    /// Names in the list.
    pub total: usize,
    /// Names fetched so far.
    pub ok: usize,
    /// Names skipped so far.
    pub skipped: usize,
    /// Names failed so far.
    pub errors: usize,
    /// Time since the run started.
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    /// Requests per minute, counting fetched and failed names.
    ///
    /// Elapsed time below one second counts as one second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn requests_per_minute(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64().max(1.0);
        (self.ok + self.errors) as f64 / elapsed * 60.0
    }
}

/// Returns true when a checkpoint is due after processing `position` of `total`.
#[must_use]
pub fn is_checkpoint(position: usize, total: usize) -> bool {
    position % PROGRESS_INTERVAL == 0 || position == total
}

/// Receives run events. Every method defaults to doing nothing.
pub trait SyncObserver {
    /// Called once before the first name.
    fn on_start(&mut self, _summary: &StartSummary) {}

    /// Called before sleeping on a 429; `wait` excludes the safety margin.
    fn on_rate_limited(&mut self, _name: &Name, _wait: Duration) {}

    /// Called when a name fails for any reason other than rate-limit exhaustion.
    fn on_failed(&mut self, _name: &Name, _failure: &FailureKind) {}

    /// Called every [`PROGRESS_INTERVAL`] names and after the last one.
    fn on_progress(&mut self, _snapshot: &ProgressSnapshot) {}

    /// Called once when the run ends.
    fn on_finish(&mut self, _tally: &SyncTally) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SyncObserver for NoopObserver {}
