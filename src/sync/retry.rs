//! Bounded retry for rate-limited fetches.
//!
//! Only HTTP 429 is ever retried. Each 429 is answered with a wait derived
//! from the response, in this order:
//!
//! 1. the `retryAfter` field of a JSON body (seconds, may be fractional)
//! 2. the `Retry-After` header (seconds or HTTP-date)
//! 3. the policy's default wait
//!
//! Suggested waits are capped at [`MAX_RETRY_WAIT`]. The policy then adds a
//! fixed safety margin and decides whether another attempt is allowed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use registry_sync_core::sync::{RetryDecision, RetryPolicy};
//!
//! let policy = RetryPolicy::default();
//! match policy.should_retry(1, Some(Duration::from_secs(60))) {
//!     RetryDecision::Retry { wait, delay, attempt } => {
//!         assert_eq!(wait, Duration::from_secs(60));
//!         assert_eq!(delay, Duration::from_secs(70));
//!         assert_eq!(attempt, 2);
//!     }
//!     RetryDecision::DoNotRetry { .. } => unreachable!(),
//! }
//! ```

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, info, instrument};

use super::constants::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_MARGIN, DEFAULT_RETRY_WAIT, MAX_RETRY_WAIT,
};

/// Decision on whether to retry a rate-limited fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the same name after `delay`.
    Retry {
        /// Wait resolved from the response or the default, without margin.
        wait: Duration,
        /// Total time to sleep (`wait` plus the safety margin).
        delay: Duration,
        /// Which attempt number comes next (1-indexed).
        attempt: u32,
    },

    /// Give up on this name.
    DoNotRetry {
        /// Human-readable reason why retry is not attempted.
        reason: String,
    },
}

/// Configuration for rate-limit retries.
///
/// # Default Values
///
/// - `max_attempts`: 20
/// - `default_wait`: 300 seconds
/// - `margin`: 10 seconds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    max_attempts: u32,

    /// Wait used when the server gives no usable hint.
    default_wait: Duration,

    /// Added to every wait.
    margin: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            default_wait: DEFAULT_RETRY_WAIT,
            margin: DEFAULT_RETRY_MARGIN,
        }
    }
}

impl RetryPolicy {
    /// Creates a new retry policy. `max_attempts` is raised to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, default_wait: Duration, margin: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            default_wait,
            margin,
        }
    }

    /// Returns the maximum number of attempts configured.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the fallback wait.
    #[must_use]
    pub fn default_wait(&self) -> Duration {
        self.default_wait
    }

    /// Returns the safety margin.
    #[must_use]
    pub fn margin(&self) -> Duration {
        self.margin
    }

    /// Decides what to do after attempt number `attempt` (1-indexed) got a 429.
    ///
    /// `suggested` is the server's hint, if any. No wait is scheduled once
    /// the last attempt has been used.
    #[instrument(skip(self), fields(max_attempts = self.max_attempts))]
    pub fn should_retry(&self, attempt: u32, suggested: Option<Duration>) -> RetryDecision {
        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::DoNotRetry {
                reason: format!("max attempts ({}) exhausted", self.max_attempts),
            };
        }

        let wait = suggested.unwrap_or(self.default_wait);
        let delay = wait.saturating_add(self.margin);

        debug!(
            attempt,
            next_attempt = attempt + 1,
            wait_secs = wait.as_secs_f64(),
            delay_secs = delay.as_secs_f64(),
            "will retry"
        );

        RetryDecision::Retry {
            wait,
            delay,
            attempt: attempt + 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateLimitBody {
    #[serde(rename = "retryAfter")]
    retry_after: Option<f64>,
}

/// Extracts the `retryAfter` hint from a 429 response body.
///
/// Returns `None` for non-JSON bodies, a missing or non-numeric field, and
/// negative or non-finite values.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use registry_sync_core::sync::retry_after_from_body;
///
/// assert_eq!(
///     retry_after_from_body(r#"{"error":"rate limited","retryAfter":120}"#),
///     Some(Duration::from_secs(120))
/// );
/// assert_eq!(retry_after_from_body("Too Many Requests"), None);
/// ```
#[must_use]
pub fn retry_after_from_body(body: &str) -> Option<Duration> {
    let parsed: RateLimitBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(error) => {
            debug!(%error, "429 body has no usable retryAfter");
            return None;
        }
    };
    let seconds = parsed.retry_after?;
    if !seconds.is_finite() || seconds < 0.0 {
        debug!(seconds, "ignoring invalid retryAfter value");
        return None;
    }
    if seconds > MAX_RETRY_WAIT.as_secs_f64() {
        info!(
            seconds,
            max_secs = MAX_RETRY_WAIT.as_secs(),
            "retryAfter exceeds maximum, capping at 1 hour"
        );
        return Some(MAX_RETRY_WAIT);
    }
    Some(Duration::from_secs_f64(seconds))
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports two formats as per RFC 7231:
/// - Integer seconds: `Retry-After: 120`
/// - HTTP-date: `Retry-After: Wed, 21 Oct 2025 07:28:00 GMT`
///
/// Returns `None` if the value cannot be parsed. Caps excessive values at 1 hour.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use registry_sync_core::sync::parse_retry_after;
///
/// assert_eq!(parse_retry_after("120"), Some(Duration::from_secs(120)));
/// assert_eq!(parse_retry_after("0"), Some(Duration::ZERO));
/// assert_eq!(parse_retry_after("invalid"), None);
/// ```
#[must_use]
#[instrument]
pub fn parse_retry_after(header_value: &str) -> Option<Duration> {
    let header_value = header_value.trim();

    if let Ok(seconds) = header_value.parse::<i64>() {
        let Ok(seconds) = u64::try_from(seconds) else {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        };
        return Some(cap_wait(Duration::from_secs(seconds)));
    }

    let Ok(datetime) = httpdate::parse_http_date(header_value) else {
        debug!(header_value, "unparseable Retry-After value");
        return None;
    };
    match datetime.duration_since(std::time::SystemTime::now()) {
        Ok(duration) => Some(cap_wait(duration)),
        Err(_) => {
            debug!(header_value, "Retry-After date is in the past, returning zero");
            Some(Duration::ZERO)
        }
    }
}

/// Resolves the server's wait hint: body first, then header.
#[must_use]
pub fn resolve_rate_limit_wait(body: &str, retry_after_header: Option<&str>) -> Option<Duration> {
    retry_after_from_body(body).or_else(|| retry_after_header.and_then(parse_retry_after))
}

fn cap_wait(wait: Duration) -> Duration {
    if wait > MAX_RETRY_WAIT {
        info!(
            wait_secs = wait.as_secs(),
            max_secs = MAX_RETRY_WAIT.as_secs(),
            "rate-limit wait exceeds maximum, capping at 1 hour"
        );
        MAX_RETRY_WAIT
    } else {
        wait
    }
}
