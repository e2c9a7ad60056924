//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use registry_sync_core::sync::constants::DEFAULT_TOKEN_ENV;

/// Mirror component definitions from a rate-limited registry.
///
/// Reads a list of component names, downloads each missing `{name}.json`
/// from the registry one request at a time, and leaves existing files
/// untouched so interrupted runs can simply be restarted.
#[derive(Parser, Debug)]
#[command(name = "registry-sync")]
#[command(author, version, about)]
pub struct Args {
    /// Increase log verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress output (failures and the final summary are still printed)
    #[arg(short, long)]
    pub quiet: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/registry-sync/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// File with one component name per line [default: components.txt]
    #[arg(short = 'n', long)]
    pub names: Option<PathBuf>,

    /// Directory receiving {name}.json files [default: shadcn-registry/public/r]
    #[arg(short = 'o', long)]
    pub output_dir: Option<PathBuf>,

    /// Registry base URL; the name is appended as the last path segment
    #[arg(long)]
    pub base_url: Option<String>,

    /// Environment variable holding the registry API key
    #[arg(long, default_value = DEFAULT_TOKEN_ENV)]
    pub token_env: String,

    /// Pause after every successful download in milliseconds (max 60000)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=60_000))]
    pub request_delay_ms: Option<u64>,

    /// Wait after HTTP 429 when the registry gives no hint, in seconds (max 3600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=3600))]
    pub retry_wait_secs: Option<u64>,

    /// Extra seconds added to every rate-limit wait (max 600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(0..=600))]
    pub retry_margin_secs: Option<u64>,

    /// Maximum attempts per name while rate limited (1-100)
    #[arg(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: Option<u32>,

    /// Per-request timeout in seconds (1-600)
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout_secs: Option<u64>,

    /// Stop the whole run on the first HTTP 401
    #[arg(long)]
    pub abort_on_unauthorized: bool,

    /// Exit non-zero when any name failed (2 = some failed, 3 = all failed)
    #[arg(long)]
    pub strict: bool,
}
