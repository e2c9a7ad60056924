//! Constants for the sync module (endpoint, pacing, timeouts, rate limiting).

use std::time::Duration;

/// Default registry base URL; names are appended as the final path segment.
pub const DEFAULT_BASE_URL: &str = "https://www.shadcnblocks.com/r";

/// Default environment variable holding the registry API key.
pub const DEFAULT_TOKEN_ENV: &str = "SHADCNBLOCKS_API_KEY";

/// Default maximum attempts per name while the registry answers 429.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Pause after every successful fetch (1.5 seconds).
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(1500);

/// Wait used when a 429 response carries no usable hint (5 minutes).
pub const DEFAULT_RETRY_WAIT: Duration = Duration::from_secs(300);

/// Extra time added on top of every rate-limit wait.
pub const DEFAULT_RETRY_MARGIN: Duration = Duration::from_secs(10);

/// Upper bound for any server-suggested wait (1 hour).
pub const MAX_RETRY_WAIT: Duration = Duration::from_secs(3600);

/// Total per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// TCP connect timeout in seconds (never longer than the request timeout).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Progress is reported after every this many processed names.
pub const PROGRESS_INTERVAL: usize = 50;
