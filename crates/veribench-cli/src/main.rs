// Crate-level lint configuration for pedantic clippy
#![allow(clippy::must_use_candidate)]
#![allow(clippy::uninlined_format_args)] // Named args are clearer
#![allow(clippy::missing_errors_doc)]

//! Veribench CLI
//!
//! Runs C verification tools over a benchmark corpus and compares them.
//!
//! # Commands
//!
//! - `veribench setup` - Create the results layout and corpus folders
//! - `veribench run` - Run every applicable tool on every benchmark
//! - `veribench analyze` - Analyze the latest snapshot and write exports
//! - `veribench all` - Setup, run and analyze in one go
//! - `veribench check-tools` - Report which verification tools are reachable

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::{AnalyzeConfig, RunConfig};
use config::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;
use veribench_dispatcher::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "veribench")]
#[command(about = "Comparative evaluation of C program verification tools")]
#[command(version)]
struct Cli {
    /// Settings file (default: ./veribench.toml when present)
    #[arg(long, global = true, env = "VERIBENCH_CONFIG")]
    config: Option<PathBuf>,

    /// Benchmark corpus root
    #[arg(long, global = true, env = "VERIBENCH_CORPUS_DIR")]
    corpus_dir: Option<PathBuf>,

    /// Results directory (holds raw/ and processed/)
    #[arg(long, global = true, env = "VERIBENCH_RESULTS_DIR")]
    results_dir: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create result directories and missing corpus category folders
    Setup,
    /// Run every applicable tool on every benchmark
    Run {
        #[command(flatten)]
        overrides: RunArgs,
    },
    /// Analyze a result snapshot and write JSON and CSV exports
    Analyze {
        /// Snapshot to analyze (default: <results>/raw/latest_results.json)
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
    /// Setup, run and analyze
    All {
        #[command(flatten)]
        overrides: RunArgs,
    },
    /// Report which verification tools are reachable
    CheckTools,
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Maximum pairs in flight at once
    #[arg(long)]
    max_concurrent: Option<usize>,

    /// Per-invocation wall-clock bound in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl From<&RunArgs> for RunConfig {
    fn from(args: &RunArgs) -> Self {
        RunConfig {
            max_concurrent: args.max_concurrent,
            timeout_secs: args.timeout,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel `token` on the first Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted: finishing in-flight pairs, no new pairs will start");
            token.cancel();
        }
    });
}

fn resolve_settings(cli: &Cli) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.corpus_dir {
        settings.corpus_dir = dir.clone();
    }
    if let Some(dir) = &cli.results_dir {
        settings.results_dir = dir.clone();
    }
    Ok(settings)
}

async fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut settings = resolve_settings(&cli)?;

    match cli.command {
        Commands::Setup => commands::run_setup(&settings)?,
        Commands::Run { overrides } => {
            RunConfig::from(&overrides).apply(&mut settings);
            let token = CancellationToken::new();
            cancel_on_ctrl_c(token.clone());
            commands::run_batch(&settings, token).await?;
        }
        Commands::Analyze { snapshot } => {
            commands::run_analyze(&settings, &AnalyzeConfig { snapshot })?;
        }
        Commands::All { overrides } => {
            RunConfig::from(&overrides).apply(&mut settings);
            commands::run_setup(&settings)?;
            let token = CancellationToken::new();
            cancel_on_ctrl_c(token.clone());
            commands::run_batch(&settings, token).await?;
            commands::run_analyze(&settings, &AnalyzeConfig::default())?;
        }
        Commands::CheckTools => commands::run_check_tools(&settings).await?,
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match dispatch(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
