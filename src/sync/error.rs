//! Error types for the sync module.
//!
//! [`FetchError`] covers everything that can go wrong while fetching and
//! persisting a single name. These errors never escape the batch: the engine
//! converts them into a per-name classification via [`FetchError::kind`].
//! [`SyncError`] is reserved for conditions that stop a run before it starts.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while fetching or persisting one component.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before the response was complete.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// File system error while writing the artifact.
    #[error("IO error writing to {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, promoting timeouts.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Short, stable label used in the per-name classification (`error:<kind>`).
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Network { source, .. } => {
                if source.is_connect() {
                    "connect"
                } else if source.is_body() || source.is_decode() {
                    "body"
                } else if source.is_request() {
                    "request"
                } else {
                    "network"
                }
            }
            Self::Io { .. } => "io",
        }
    }
}

/// Errors that abort a sync run before any name is processed.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    OutputDir {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },
}
