//! Registry synchronization: fetch missing components and write them to disk.
//!
//! # Features
//!
//! - One authenticated GET per missing name, strictly sequential
//! - Existing `{name}.json` artifacts are never re-fetched or overwritten
//! - Fixed pacing delay after every successful fetch
//! - Bounded retry on HTTP 429 using the server's `retryAfter` hint
//! - Per-name failure isolation with `error:<kind>` classification
//!
//! See [`Synchronizer`] for the run loop.

pub mod constants;

mod client;
mod engine;
mod error;
mod outcome;
mod progress;
mod retry;

pub use client::{FetchReply, RegistryClient, USER_AGENT};
pub use constants::PROGRESS_INTERVAL;
pub use engine::{FailedName, SyncTally, Synchronizer};
pub use error::{FetchError, SyncError};
pub use outcome::{FailureKind, Outcome};
pub use progress::{NoopObserver, ProgressSnapshot, StartSummary, SyncObserver, is_checkpoint};
pub use retry::{
    RetryDecision, RetryPolicy, parse_retry_after, resolve_rate_limit_wait, retry_after_from_body,
};
