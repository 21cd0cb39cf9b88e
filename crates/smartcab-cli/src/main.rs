//! smartcab CLI - Train the learning cab and inspect what it learned

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::unused_async)]
#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{config as config_cmd, run, table};
use crate::config::{Config, LoggingConfig};

#[derive(Parser)]
#[command(name = "smartcab")]
#[command(
    author,
    version,
    about = "smartcab - a Q-learning agent for a simulated cab",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file. Defaults to SMARTCAB_CONFIG, then ./smartcab.toml,
    /// then ~/.config/smartcab/smartcab.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent for a number of trials
    Run(run::RunArgs),

    /// Inspect exported value tables
    #[command(subcommand)]
    Table(table::TableCommands),

    /// Configuration management
    #[command(subcommand)]
    Config(config_cmd::ConfigCommands),
}

fn init_logging(logging: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { logging.level.as_str() };

    // Targets match by prefix, so this covers smartcab_rl and smartcab_sim too.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("smartcab={level}").into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(logging.json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!logging.json).then(tracing_subscriber::fmt::layer))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = Config::find_config_file(cli.config.as_deref());
    let config = Config::load(config_path.as_deref())?;

    init_logging(&config.logging, cli.verbose);
    match &config_path {
        Some(path) => tracing::info!("Loaded config from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Run(args) => run::run(args, config).await,
        Commands::Table(cmd) => table::run(cmd).await,
        Commands::Config(cmd) => config_cmd::run(cmd, &config, config_path.as_deref()).await,
    }
}
