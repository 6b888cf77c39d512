//! Experiment telemetry cleaning CLI
//!
//! Normalizes experiment folder layouts, cleans process-mapping files and
//! resamples raw energy traces to one-second granularity.

mod commands;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{headers, run, scan};
use pipeline_lib::{Pipeline, PipelineConfig, Stage};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Experiment telemetry cleaning pipeline
#[derive(Parser)]
#[command(name = "expclean")]
#[command(author, version, about = "Experiment telemetry cleaning pipeline", long_about = None)]
pub struct Cli {
    /// Root directory holding experiment folders (defaults to the current directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Do not write .bak copies before rewriting mapping files
    #[arg(long)]
    pub no_backup: bool,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every stage in order (default)
    Run,

    /// Move loose raw traces into raw_results/<source>/
    Normalize,

    /// Remove duplicate and variant header lines from mapping files
    DedupHeaders,

    /// Standardize node names in mapping files
    Standardize,

    /// Resample raw energy traces to one-second rows
    Resample,

    /// List experiment folders and their layout state
    Scan,
}

fn init_tracing(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut config =
        PipelineConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    if cli.no_backup {
        config.make_backup = false;
    }

    tracing::info!(
        root = %config.root.display(),
        backup = config.make_backup,
        "Configuration loaded"
    );
    let pipeline = Pipeline::new(config);

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::run_stages(&pipeline, &Stage::ORDER, cli.format)?,
        Commands::Normalize => run::run_stages(&pipeline, &[Stage::Normalize], cli.format)?,
        Commands::DedupHeaders => headers::dedup_headers(&pipeline, cli.format)?,
        Commands::Standardize => run::run_stages(&pipeline, &[Stage::Standardize], cli.format)?,
        Commands::Resample => run::run_stages(&pipeline, &[Stage::Resample], cli.format)?,
        Commands::Scan => scan::show_experiments(&pipeline, cli.format)?,
    }

    Ok(())
}
