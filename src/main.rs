//! CLI entry point for the registry sync tool.

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use registry_sync_core::{SyncConfig, SyncTally, Synchronizer, read_names};
use tracing::{debug, info, warn};

mod app_config;
mod cli;
mod output;

use cli::Args;
use output::ConsoleObserver;

/// Process exit outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    /// Run completed (any per-name failures were only reported).
    Success,
    /// The run could not start (missing credential, bad config, unreadable list).
    SetupError,
    /// `--strict`: some names failed, others succeeded or were present.
    Partial,
    /// `--strict`: every processed name failed.
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::SetupError => ExitCode::from(1),
            ProcessExit::Partial => ExitCode::from(2),
            ProcessExit::Failure => ExitCode::from(3),
        }
    }
}

/// Maps a finished run to the exit outcome. Without `strict` it always succeeds.
fn determine_exit_outcome(tally: &SyncTally, strict: bool) -> ProcessExit {
    if !strict || tally.errors == 0 {
        ProcessExit::Success
    } else if tally.ok + tally.skipped > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();
    init_tracing(&args);

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(err) => {
            eprintln!("ERROR: {err:#}");
            ProcessExit::SetupError.into()
        }
    }
}

/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (warn).
fn init_tracing(args: &Args) {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(use_color(
            std::io::stderr().is_terminal(),
            std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty()),
            std::env::var("TERM").is_ok_and(|value| value.eq_ignore_ascii_case("dumb")),
        ))
        .with_env_filter(filter)
        .try_init();
}

/// Color only for an interactive stderr, unless `NO_COLOR` or `TERM=dumb` say otherwise.
fn use_color(stderr_is_terminal: bool, no_color_env: bool, dumb_terminal: bool) -> bool {
    stderr_is_terminal && !no_color_env && !dumb_terminal
}

async fn run(args: Args) -> Result<ProcessExit> {
    debug!(?args, "CLI arguments parsed");

    let file_config = app_config::load_file_config(args.config.as_deref())?;
    let settings = app_config::resolve_settings(&args, file_config.as_ref());

    // The credential check runs before the name list or output directory is touched.
    let config = SyncConfig::from_env(
        &args.token_env,
        &settings.base_url,
        settings.output_dir.clone(),
        settings.policy.clone(),
    )?;

    let list = read_names(&settings.names_file)?;
    for rejected in &list.rejected {
        warn!(
            line = rejected.line,
            value = %rejected.raw,
            reason = %rejected.reason,
            "Skipped unusable name"
        );
    }

    info!(
        names = list.len(),
        output_dir = %settings.output_dir.display(),
        base_url = %settings.base_url,
        "Registry sync starting"
    );

    let synchronizer = Synchronizer::new(&config).context("Failed to initialize HTTP client")?;
    let mut observer = ConsoleObserver::new(args.quiet);
    let tally = synchronizer.synchronize(&list.names, &mut observer).await?;

    Ok(determine_exit_outcome(&tally, args.strict))
}
