//! Console output for sync runs.
//!
//! Progress and summary lines go to stdout; logs go to stderr through
//! tracing. Formatting lives in free functions so it can be tested without
//! capturing stdout.

use std::time::Duration;

use registry_sync_core::{FailureKind, Name, ProgressSnapshot, StartSummary, SyncObserver, SyncTally};

/// Prints run events to stdout.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    quiet: bool,
    total: usize,
}

impl ConsoleObserver {
    /// Creates an observer; `quiet` hides start, progress and rate-limit lines.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self { quiet, total: 0 }
    }
}

impl SyncObserver for ConsoleObserver {
    fn on_start(&mut self, summary: &StartSummary) {
        self.total = summary.total;
        if !self.quiet {
            println!("{}", format_start(summary));
        }
    }

    fn on_rate_limited(&mut self, _name: &Name, wait: Duration) {
        if !self.quiet {
            println!("{}", format_rate_limited(wait));
        }
    }

    fn on_failed(&mut self, name: &Name, failure: &FailureKind) {
        println!("{}", format_failed(name, failure));
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        if !self.quiet {
            println!("{}", format_progress(snapshot));
        }
    }

    fn on_finish(&mut self, tally: &SyncTally) {
        println!();
        if tally.aborted {
            println!(
                "Aborted after an unauthorized response; {} names not processed.",
                self.total.saturating_sub(tally.processed())
            );
        }
        println!("{}", format_summary(tally));
    }
}

/// `Total: N | Already downloaded: K | Remaining: R`
#[must_use]
pub fn format_start(summary: &StartSummary) -> String {
    format!(
        "Total: {} | Already downloaded: {} | Remaining: {}",
        summary.total,
        summary.already_downloaded,
        summary.remaining()
    )
}

/// `  Rate limited. Waiting 300s...`
#[must_use]
pub fn format_rate_limited(wait: Duration) -> String {
    format!("  Rate limited. Waiting {}s...", wait.as_secs_f64())
}

/// `  SKIP [hero1]: error:404`
#[must_use]
pub fn format_failed(name: &Name, failure: &FailureKind) -> String {
    format!("  SKIP [{name}]: {failure}")
}

/// `  50/812 - ok:40 skipped:8 errors:2 (24 req/min)`
#[must_use]
pub fn format_progress(snapshot: &ProgressSnapshot) -> String {
    format!(
        "  {}/{} - ok:{} skipped:{} errors:{} ({:.0} req/min)",
        snapshot.position,
        snapshot.total,
        snapshot.ok,
        snapshot.skipped,
        snapshot.errors,
        snapshot.requests_per_minute()
    )
}

/// `Done. 40 downloaded, 8 skipped, 2 errors.`
#[must_use]
pub fn format_summary(tally: &SyncTally) -> String {
    format!(
        "Done. {} downloaded, {} skipped, {} errors.",
        tally.ok, tally.skipped, tally.errors
    )
}
