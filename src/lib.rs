//! Registry Sync Core Library
//!
//! This library mirrors a fixed list of named component definitions from a
//! remote, rate-limited HTTP registry into a local directory, one
//! `{name}.json` file per component.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Validated run configuration (credential, base URL, policy)
//! - [`names`] - Name list parsing
//! - [`sync`] - Registry client, rate-limit retry and the sequential synchronizer

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod names;
pub mod sync;

// Re-export commonly used types
pub use config::{ConfigError, Credential, SyncConfig, SyncPolicy};
pub use names::{Name, NameList, NameListError, parse_names, read_names};
pub use sync::{
    FailureKind, FetchError, NoopObserver, Outcome, ProgressSnapshot, RetryPolicy, StartSummary,
    SyncError, SyncObserver, SyncTally, Synchronizer,
};
