//! Validated run configuration.
//!
//! A [`SyncConfig`] can only be built with a non-empty credential and a
//! usable base URL, so a missing API key is caught once, before any file or
//! network I/O, instead of surfacing as a 401 on every name.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::sync::RetryPolicy;
use crate::sync::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_REQUEST_DELAY, REQUEST_TIMEOUT_SECS};

/// Errors raised while building a [`SyncConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The credential environment variable is unset or blank.
    #[error("{var} not set")]
    MissingCredential {
        /// Name of the environment variable that was consulted.
        var: String,
    },

    /// The base URL is not an absolute http(s) URL that can take path segments.
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
    },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {source}")]
    HttpClient {
        /// The underlying builder error.
        #[source]
        source: reqwest::Error,
    },
}

/// Bearer token for the registry. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token, rejecting empty or whitespace-only values.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Reads the token from environment variable `var`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] if the variable is unset,
    /// not valid unicode, or blank.
    pub fn from_env(var: &str) -> Result<Self, ConfigError> {
        env::var(var)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| ConfigError::MissingCredential {
                var: var.to_string(),
            })
    }

    /// Returns the raw token for the Authorization header.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Pacing, timeout and failure-handling knobs for a run.
#[derive(Debug, Clone)]
pub struct SyncPolicy {
    /// Rate-limit retry behavior.
    pub retry: RetryPolicy,
    /// Pause after every successful fetch.
    pub request_delay: Duration,
    /// Total timeout for one request, including reading the body.
    pub request_timeout: Duration,
    /// TCP connect timeout (clamped to `request_timeout`).
    pub connect_timeout: Duration,
    /// Stop the whole batch on the first HTTP 401 instead of moving on.
    pub abort_on_unauthorized: bool,
}

impl Default for SyncPolicy {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            request_delay: DEFAULT_REQUEST_DELAY,
            request_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            abort_on_unauthorized: false,
        }
    }
}

/// Everything a [`Synchronizer`](crate::Synchronizer) needs for one run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    base_url: Url,
    credential: Credential,
    output_dir: PathBuf,
    policy: SyncPolicy,
}

impl SyncConfig {
    /// Builds a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute http(s) URL.
    pub fn new(
        base_url: &str,
        credential: Credential,
        output_dir: impl Into<PathBuf>,
        policy: SyncPolicy,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self {
            base_url,
            credential,
            output_dir: output_dir.into(),
            policy,
        })
    }

    /// Builds a configuration with the credential taken from `token_var`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when the variable is unset
    /// or blank, and [`ConfigError::InvalidBaseUrl`] as in [`SyncConfig::new`].
    pub fn from_env(
        token_var: &str,
        base_url: &str,
        output_dir: impl Into<PathBuf>,
        policy: SyncPolicy,
    ) -> Result<Self, ConfigError> {
        let credential = Credential::from_env(token_var)?;
        Self::new(base_url, credential, output_dir, policy)
    }

    /// Registry base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Registry credential.
    #[must_use]
    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Directory receiving `{name}.json` artifacts.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run policy.
    #[must_use]
    pub fn policy(&self) -> &SyncPolicy {
        &self.policy
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = || ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
    };
    let url = Url::parse(raw.trim()).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}
