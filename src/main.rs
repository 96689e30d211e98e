//! touchgrid - touch contact tracker tooling
//!
//! Replays recorded touch traces through the tracker, or drives it
//! interactively from a REPL.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod replay;

use touchgrid::trace::Trace;
use touchgrid::{Platform, TouchTracker, TrackerConfig};

/// touchgrid - reconcile jittery touch events into stable contacts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "TOUCHGRID_CONFIG", default_value = "touchgrid.yaml")]
    config: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    /// Override the configured platform profile
    #[arg(long)]
    platform: Option<Platform>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a recorded trace (.csv or .json)
    Replay {
        trace: PathBuf,

        /// Emit one JSON object per frame instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Drive a tracker interactively
    Repl,
    /// Load and validate the configuration
    CheckConfig,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();

    init_logging(&args.log_level, args.log_format)?;

    let mut config = TrackerConfig::load_or_default(&args.config)?;
    if let Some(platform) = args.platform {
        config.platform = platform;
    }
    info!(
        "Tracker: capacity={}, platform={}, replayed_release_as_move={}",
        config.capacity,
        config.platform,
        config.replayed_release_as_move()
    );

    match args.command {
        Command::Replay { trace, json } => {
            let trace = Trace::load(&trace)?;
            let mut tracker = TouchTracker::from_config(&config);
            let summary = replay::run_replay(&mut tracker, &trace, json)?;

            if !json {
                println!(
                    "\n{} {} frames, {} applied, {} dropped",
                    "Done:".bold().green(),
                    summary.frames,
                    summary.applied,
                    summary.dropped
                );
            }
        }
        Command::Repl => {
            cli::run_repl(TouchTracker::from_config(&config))?;
        }
        Command::CheckConfig => {
            println!("{}", "=== Effective configuration ===".bold().cyan());
            print!("{}", serde_yaml::to_string(&config)?);
            println!(
                "{} replayed_release_as_move = {}",
                "Quirk:".bold(),
                config.replayed_release_as_move()
            );
            println!("{}", "✅ Configuration is valid".green());
        }
    }

    Ok(())
}

fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }

    Ok(())
}
