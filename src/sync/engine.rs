//! Sequential synchronizer.
//!
//! The [`Synchronizer`] walks the name list in order on a single task. For
//! each name it either finds the artifact already on disk, or fetches it
//! with a bounded rate-limit retry loop:
//!
//! ```text
//! attempting --200--> write artifact --> ok --> pacing delay
//!      |      --429--> backing off --> attempting (same name)
//!      |      --401/other/transport--> terminal error
//!      +-- attempts exhausted --> error:rate_limit_exhausted
//! ```
//!
//! Failures are isolated per name; only the output directory setup can fail
//! the run as a whole.
//!
//! # Example
//!
//! ```no_run
//! use registry_sync_core::{Credential, SyncConfig, SyncPolicy, Synchronizer};
//! use registry_sync_core::names::parse_names;
//! use registry_sync_core::sync::NoopObserver;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig::new(
//!     "https://www.shadcnblocks.com/r",
//!     Credential::new("sk_live_...").ok_or("empty token")?,
//!     "shadcn-registry/public/r",
//!     SyncPolicy::default(),
//! )?;
//! let synchronizer = Synchronizer::new(&config)?;
//! let names = parse_names("hero1\nabout6\n").names;
//! let tally = synchronizer.synchronize(&names, &mut NoopObserver).await?;
//! println!("ok: {}, skipped: {}, errors: {}", tally.ok, tally.skipped, tally.errors);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument};

use super::client::{FetchReply, RegistryClient};
use super::error::{FetchError, SyncError};
use super::outcome::{FailureKind, Outcome};
use super::progress::{ProgressSnapshot, StartSummary, SyncObserver, is_checkpoint};
use super::retry::RetryDecision;
use crate::config::{ConfigError, SyncConfig, SyncPolicy};
use crate::names::Name;

/// A name that ended without an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedName {
    /// The name.
    pub name: Name,
    /// Why it failed.
    pub failure: FailureKind,
}

/// Outcome counts for one run. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncTally {
    /// Names fetched and written.
    pub ok: usize,
    /// Names already on disk.
    pub skipped: usize,
    /// Names that failed.
    pub errors: usize,
    /// Number of 429 responses that led to a wait.
    pub rate_limit_waits: usize,
    /// Every failed name with its classification, in processing order.
    pub failures: Vec<FailedName>,
    /// True when the run stopped early on a 401.
    pub aborted: bool,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl SyncTally {
    /// Names processed (ok + skipped + errors).
    #[must_use]
    pub fn processed(&self) -> usize {
        self.ok + self.skipped + self.errors
    }

    fn record(&mut self, name: &Name, outcome: &Outcome) {
        match outcome {
            Outcome::Ok => self.ok += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed(failure) => {
                self.errors += 1;
                self.failures.push(FailedName {
                    name: name.clone(),
                    failure: failure.clone(),
                });
            }
        }
    }

    fn snapshot(&self, position: usize, total: usize, elapsed: Duration) -> ProgressSnapshot {
        ProgressSnapshot {
            position,
            total,
            ok: self.ok,
            skipped: self.skipped,
            errors: self.errors,
            elapsed,
        }
    }
}

/// Fetches missing artifacts one name at a time.
#[derive(Debug, Clone)]
pub struct Synchronizer {
    client: RegistryClient,
    output_dir: PathBuf,
    policy: SyncPolicy,
}

impl Synchronizer {
    /// Creates a synchronizer from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::HttpClient`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(config), fields(base_url = %config.base_url()))]
    pub fn new(config: &SyncConfig) -> Result<Self, ConfigError> {
        let policy = config.policy().clone();
        debug!(
            max_attempts = policy.retry.max_attempts(),
            request_delay_ms = policy.request_delay.as_millis(),
            request_timeout_secs = policy.request_timeout.as_secs(),
            abort_on_unauthorized = policy.abort_on_unauthorized,
            "creating synchronizer"
        );
        Ok(Self {
            client: RegistryClient::new(config)?,
            output_dir: config.output_dir().to_path_buf(),
            policy,
        })
    }

    /// Path of the artifact for `name`.
    #[must_use]
    pub fn artifact_path(&self, name: &Name) -> PathBuf {
        self.output_dir.join(name.file_name())
    }

    /// Ensures every name has an artifact, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::OutputDir`] if the output directory cannot be
    /// created. Per-name failures never error; they are counted in the
    /// returned [`SyncTally`].
    #[instrument(skip(self, names, observer), fields(output_dir = %self.output_dir.display(), total = names.len()))]
    pub async fn synchronize(
        &self,
        names: &[Name],
        observer: &mut dyn SyncObserver,
    ) -> Result<SyncTally, SyncError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| SyncError::OutputDir {
                path: self.output_dir.clone(),
                source,
            })?;

        let total = names.len();
        let mut already_downloaded = 0;
        for name in names {
            if matches!(artifact_exists(&self.artifact_path(name)).await, Ok(true)) {
                already_downloaded += 1;
            }
        }
        let summary = StartSummary {
            total,
            already_downloaded,
        };
        info!(
            total,
            already_downloaded,
            remaining = summary.remaining(),
            "starting sync"
        );
        observer.on_start(&summary);

        let started = Instant::now();
        let mut tally = SyncTally::default();

        for (index, name) in names.iter().enumerate() {
            let position = index + 1;
            let outcome = self.sync_one(name, &mut tally, observer).await;
            tally.record(name, &outcome);

            let mut stop = false;
            match &outcome {
                Outcome::Ok => {
                    if position < total && !self.policy.request_delay.is_zero() {
                        tokio::time::sleep(self.policy.request_delay).await;
                    }
                }
                Outcome::Skipped => {}
                Outcome::Failed(failure) => {
                    info!(name = %name, classification = %failure, "name failed");
                    if *failure != FailureKind::RateLimitExhausted {
                        observer.on_failed(name, failure);
                    }
                    if *failure == FailureKind::Unauthorized && self.policy.abort_on_unauthorized
                    {
                        info!(
                            remaining = total - position,
                            "aborting run after unauthorized response"
                        );
                        tally.aborted = true;
                        stop = true;
                    }
                }
            }

            if stop || is_checkpoint(position, total) {
                observer.on_progress(&tally.snapshot(position, total, started.elapsed()));
            }
            if stop {
                break;
            }
        }

        tally.elapsed = started.elapsed();
        info!(
            ok = tally.ok,
            skipped = tally.skipped,
            errors = tally.errors,
            rate_limit_waits = tally.rate_limit_waits,
            aborted = tally.aborted,
            elapsed_secs = tally.elapsed.as_secs(),
            "sync finished"
        );
        observer.on_finish(&tally);
        Ok(tally)
    }

    /// Processes one name: existence check, then the bounded fetch loop.
    #[instrument(skip(self, tally, observer), fields(name = %name))]
    async fn sync_one(
        &self,
        name: &Name,
        tally: &mut SyncTally,
        observer: &mut dyn SyncObserver,
    ) -> Outcome {
        let path = self.artifact_path(name);
        match artifact_exists(&path).await {
            Ok(true) => {
                debug!(path = %path.display(), "artifact present, skipping");
                return Outcome::Skipped;
            }
            Ok(false) => {}
            Err(e) => {
                // Presence is unknown; fetching could replace an existing artifact.
                debug!(error = %e, "existence check failed");
                return Outcome::Failed(FailureKind::Io);
            }
        }

        let mut attempt = 1;
        loop {
            let reply = match self.client.fetch(name).await {
                Ok(reply) => reply,
                Err(e) => {
                    debug!(error = %e, "transport failure");
                    return Outcome::Failed(FailureKind::Transport(e.kind()));
                }
            };

            match reply {
                FetchReply::Body(body) => {
                    return match write_artifact(&path, &body).await {
                        Ok(()) => {
                            info!(path = %path.display(), bytes = body.len(), "component saved");
                            Outcome::Ok
                        }
                        Err(e) => {
                            debug!(error = %e, "failed to write artifact");
                            Outcome::Failed(FailureKind::Io)
                        }
                    };
                }
                FetchReply::RateLimited { suggested_wait } => {
                    match self.policy.retry.should_retry(attempt, suggested_wait) {
                        RetryDecision::Retry {
                            wait,
                            delay,
                            attempt: next,
                        } => {
                            info!(
                                attempt,
                                wait_secs = wait.as_secs_f64(),
                                "rate limited, backing off"
                            );
                            tally.rate_limit_waits += 1;
                            observer.on_rate_limited(name, wait);
                            tokio::time::sleep(delay).await;
                            attempt = next;
                        }
                        RetryDecision::DoNotRetry { reason } => {
                            info!(attempt, reason = %reason, "rate limit retries exhausted");
                            return Outcome::Failed(FailureKind::RateLimitExhausted);
                        }
                    }
                }
                FetchReply::Unauthorized => return Outcome::Failed(FailureKind::Unauthorized),
                FetchReply::Status(status) => {
                    return Outcome::Failed(FailureKind::HttpStatus(status));
                }
            }
        }
    }
}

async fn artifact_exists(path: &Path) -> Result<bool, FetchError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|e| FetchError::io(path, e))
}

/// Writes `body` next to `path` and renames it into place.
///
/// The artifact path only ever appears with complete content, so a run
/// killed mid-write is retried on the next invocation.
async fn write_artifact(path: &Path, body: &str) -> Result<(), FetchError> {
    let staging = staging_path(path);
    if let Err(e) = tokio::fs::write(&staging, body).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(FetchError::io(staging, e));
    }
    if let Err(e) = tokio::fs::rename(&staging, path).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(FetchError::io(path, e));
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{file_name}.part"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Credential;

    fn synchronizer(output_dir: &Path) -> Synchronizer {
        let config = SyncConfig::new(
            "http://127.0.0.1:9/r",
            Credential::new("token").unwrap(),
            output_dir,
            SyncPolicy::default(),
        )
        .unwrap();
        Synchronizer::new(&config).unwrap()
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/out/hero1.json")),
            PathBuf::from("/out/.hero1.json.part")
        );
    }

    #[test]
    fn test_artifact_path_uses_json_extension() {
        let sync = synchronizer(Path::new("/out"));
        let name = Name::parse("about6").unwrap();
        assert_eq!(sync.artifact_path(&name), PathBuf::from("/out/about6.json"));
    }

    #[tokio::test]
    async fn test_write_artifact_leaves_no_staging_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("hero1.json");
        write_artifact(&path, "{\"name\":\"hero1\"}").await.unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "{\"name\":\"hero1\"}"
        );
        assert!(!dir.path().join(".hero1.json.part").exists());
    }

    #[tokio::test]
    async fn test_write_artifact_into_missing_dir_is_io_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing").join("hero1.json");
        let err = write_artifact(&path, "{}").await.unwrap_err();
        assert_eq!(err.kind(), "io");
    }

    #[tokio::test]
    async fn test_all_present_makes_no_requests() {
        // The base URL points at a closed port: any request would fail.
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.json"), "A").unwrap();
        std::fs::write(dir.path().join("b.json"), "B").unwrap();
        let names = vec![Name::parse("a").unwrap(), Name::parse("b").unwrap()];

        let tally = synchronizer(dir.path())
            .synchronize(&names, &mut crate::sync::NoopObserver)
            .await
            .unwrap();

        assert_eq!((tally.ok, tally.skipped, tally.errors), (0, 2, 0));
        assert_eq!(std::fs::read_to_string(dir.path().join("a.json")).unwrap(), "A");
    }

    #[tokio::test]
    async fn test_failed_existence_check_is_io_error_without_request() {
        // A file name over the usual 255-byte limit makes the existence check fail.
        // The base URL is a closed port, so a fetch would be classified as "connect".
        let dir = tempfile::TempDir::new().unwrap();
        let name = Name::parse(&"x".repeat(300)).unwrap();
        let mut observer = Recorder::default();

        let tally = synchronizer(dir.path())
            .synchronize(&[name], &mut observer)
            .await
            .unwrap();

        assert_eq!(tally.errors, 1);
        assert_eq!(tally.failures[0].failure, FailureKind::Io);
        assert_eq!(observer.failed, ["error:io"]);
    }

    #[derive(Default)]
    struct Recorder {
        failed: Vec<String>,
    }

    impl crate::sync::SyncObserver for Recorder {
        fn on_failed(&mut self, _name: &Name, failure: &FailureKind) {
            self.failed.push(failure.to_string());
        }
    }

    #[tokio::test]
    async fn test_empty_list_creates_output_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("public").join("r");
        let tally = synchronizer(&out)
            .synchronize(&[], &mut crate::sync::NoopObserver)
            .await
            .unwrap();
        assert_eq!(tally.processed(), 0);
        assert!(out.is_dir());
    }
}
