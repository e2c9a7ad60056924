//! Application configuration: config file loading and flag resolution.
//!
//! Priority for every setting: command-line flag, then config file, then
//! built-in default. The API key is never read from the file.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use registry_sync_core::sync::constants::{
    DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_DELAY, DEFAULT_RETRY_MARGIN,
    DEFAULT_RETRY_WAIT, REQUEST_TIMEOUT_SECS,
};
use registry_sync_core::{RetryPolicy, SyncPolicy};

use crate::cli::Args;

/// Default name list path.
pub const DEFAULT_NAMES_FILE: &str = "components.txt";

/// Default output directory.
pub const DEFAULT_OUTPUT_DIR: &str = "shadcn-registry/public/r";

/// Key = value file configuration for run defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Registry base URL.
    pub base_url: Option<String>,
    /// Output directory for artifacts.
    pub output_dir: Option<PathBuf>,
    /// Name list path.
    pub names_file: Option<PathBuf>,
    /// Pause after each successful download in milliseconds.
    pub request_delay_ms: Option<u64>,
    /// Fallback wait after HTTP 429 in seconds.
    pub retry_wait_secs: Option<u64>,
    /// Margin added to each rate-limit wait in seconds.
    pub retry_margin_secs: Option<u64>,
    /// Maximum attempts per name while rate limited.
    pub max_attempts: Option<u32>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Validates config values against the same ranges as the CLI flags.
    pub fn validate(&self) -> Result<()> {
        validate_range("request_delay_ms", self.request_delay_ms, 0, 60_000)?;
        validate_range("retry_wait_secs", self.retry_wait_secs, 0, 3600)?;
        validate_range("retry_margin_secs", self.retry_margin_secs, 0, 600)?;
        validate_range(
            "max_attempts",
            self.max_attempts.map(u64::from),
            1,
            100,
        )?;
        validate_range("request_timeout_secs", self.request_timeout_secs, 1, 600)?;
        Ok(())
    }
}

fn validate_range(field: &str, value: Option<u64>, min: u64, max: u64) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(min..=max).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: {min}..={max}");
    }
    Ok(())
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    /// Name list path.
    pub names_file: PathBuf,
    /// Output directory.
    pub output_dir: PathBuf,
    /// Registry base URL.
    pub base_url: String,
    /// Pacing, retry and timeout policy.
    pub policy: SyncPolicy,
}

/// Merges CLI flags over file config over defaults.
#[must_use]
pub fn resolve_settings(args: &Args, file: Option<&FileConfig>) -> ResolvedSettings {
    let file = file.cloned().unwrap_or_default();

    let request_delay = args
        .request_delay_ms
        .or(file.request_delay_ms)
        .map_or(DEFAULT_REQUEST_DELAY, Duration::from_millis);
    let retry_wait = args
        .retry_wait_secs
        .or(file.retry_wait_secs)
        .map_or(DEFAULT_RETRY_WAIT, Duration::from_secs);
    let retry_margin = args
        .retry_margin_secs
        .or(file.retry_margin_secs)
        .map_or(DEFAULT_RETRY_MARGIN, Duration::from_secs);
    let max_attempts = args
        .max_attempts
        .or(file.max_attempts)
        .unwrap_or(DEFAULT_MAX_ATTEMPTS);
    let request_timeout = Duration::from_secs(
        args.timeout_secs
            .or(file.request_timeout_secs)
            .unwrap_or(REQUEST_TIMEOUT_SECS),
    );

    ResolvedSettings {
        names_file: args
            .names
            .clone()
            .or(file.names_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_NAMES_FILE)),
        output_dir: args
            .output_dir
            .clone()
            .or(file.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
        base_url: args
            .base_url
            .clone()
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        policy: SyncPolicy {
            retry: RetryPolicy::new(max_attempts, retry_wait, retry_margin),
            request_delay,
            request_timeout,
            abort_on_unauthorized: args.abort_on_unauthorized,
            ..SyncPolicy::default()
        },
    }
}

/// Default config location: `$XDG_CONFIG_HOME/registry-sync/config.toml`,
/// falling back to `$HOME/.config/registry-sync/config.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    config_path_in(env::var_os("XDG_CONFIG_HOME"), env::var_os("HOME"))
}

fn config_path_in(xdg_config_home: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let config_root = match xdg_config_home.filter(|dir| !dir.is_empty()) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(home.filter(|dir| !dir.is_empty())?).join(".config"),
    };
    Some(config_root.join("registry-sync").join("config.toml"))
}

/// Loads the config file.
///
/// An explicit path must exist; the default path is optional.
pub fn load_file_config(explicit: Option<&Path>) -> Result<Option<FileConfig>> {
    if let Some(path) = explicit {
        return read_file_config(path).map(Some);
    }
    match default_config_path() {
        Some(path) if path.exists() => read_file_config(&path).map(Some),
        _ => Ok(None),
    }
}

fn read_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

/// Right-hand side of a `key = value` line, with any trailing comment removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawValue<'a> {
    /// Contents of a double-quoted string; `#` inside the quotes is kept.
    Quoted(&'a str),
    /// Unquoted token.
    Bare(&'a str),
}

impl<'a> RawValue<'a> {
    fn parse(value: &'a str) -> Result<Self> {
        let value = value.trim_start();
        if let Some(quoted) = value.strip_prefix('"') {
            let Some((content, rest)) = quoted.split_once('"') else {
                bail!("Unterminated string");
            };
            let rest = rest.trim();
            if !rest.is_empty() && !rest.starts_with('#') {
                bail!("Unexpected text after string: {rest}");
            }
            return Ok(Self::Quoted(content));
        }
        let bare = value.split('#').next().unwrap_or_default().trim();
        Ok(Self::Bare(bare))
    }

    fn into_string(self) -> Result<String> {
        match self {
            Self::Quoted(content) => Ok(content.to_string()),
            Self::Bare(_) => bail!("Expected double-quoted string"),
        }
    }

    fn into_path(self) -> Result<PathBuf> {
        self.into_string().map(PathBuf::from)
    }

    fn into_u64(self) -> Result<u64> {
        match self {
            Self::Bare("") => bail!("Expected integer value"),
            Self::Bare(token) => token
                .parse::<u64>()
                .with_context(|| format!("Expected non-negative integer, got `{token}`")),
            Self::Quoted(_) => bail!("Expected integer, not a string"),
        }
    }
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (index, line) in raw.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_number}: expected key = value");
        };
        let key = key.trim();
        let context = || format!("Invalid `{key}` value on line {line_number}");
        let value = RawValue::parse(value).with_context(context)?;

        match key {
            "base_url" => cfg.base_url = Some(value.into_string().with_context(context)?),
            "output_dir" => cfg.output_dir = Some(value.into_path().with_context(context)?),
            "names_file" => cfg.names_file = Some(value.into_path().with_context(context)?),
            "request_delay_ms" => {
                cfg.request_delay_ms = Some(value.into_u64().with_context(context)?);
            }
            "retry_wait_secs" => {
                cfg.retry_wait_secs = Some(value.into_u64().with_context(context)?);
            }
            "retry_margin_secs" => {
                cfg.retry_margin_secs = Some(value.into_u64().with_context(context)?);
            }
            "max_attempts" => {
                let attempts = value.into_u64().with_context(context)?;
                cfg.max_attempts = Some(u32::try_from(attempts).with_context(context)?);
            }
            "request_timeout_secs" => {
                cfg.request_timeout_secs = Some(value.into_u64().with_context(context)?);
            }
            other => bail!("Unknown config key `{other}` on line {line_number}"),
        }
    }

    cfg.validate()?;
    Ok(cfg)
}
