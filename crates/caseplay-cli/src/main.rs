//! Caseplay CLI - Scripted investigation replay
//!
//! Plays a scripted customer-support investigation as a stream of
//! timestamped events, either once or continuously with autoplay cycling
//! through the known subjects.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use caseplay_config::{Config, ResolvedConfig};
use clap::{Parser, Subcommand};

mod commands;
mod config_bridge;
mod presenter;
mod theme;

use commands::{config, demo, run, subjects};
use theme::print_banner;

/// Caseplay - Scripted investigation replay
#[derive(Parser)]
#[command(name = "caseplay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a configuration file (defaults to ./caseplay.toml if present)
    #[arg(short, long, global = true, env = "CASEPLAY_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the subjects in the reference data
    Subjects,

    /// Play the investigation once
    Run {
        /// Subject to investigate (defaults to the configured initial subject)
        #[arg(short, long)]
        subject: Option<String>,
    },

    /// Play the initial investigation, then autoplay through the subjects
    Demo {
        /// Stop after this many autoplay runs
        #[arg(long)]
        cycles: Option<u32>,

        /// Play the initial run only
        #[arg(long)]
        no_autoplay: bool,
    },

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
    },
    /// Validate the current configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = Config::load(cli.config.as_deref());

    // Set up logging from config, with --verbose override.
    let log_config = if let Ok(resolved) = &resolved {
        let mut lc = config_bridge::to_log_config(&resolved.config);
        if cli.verbose {
            "debug".clone_into(&mut lc.level);
        }
        lc
    } else {
        // Fallback if config loading fails.
        let level = if cli.verbose { "debug" } else { "info" };
        caseplay_telemetry::LogConfig::new(level)
            .with_format(caseplay_telemetry::LogFormat::Compact)
    };
    if let Err(e) = caseplay_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let resolved = resolved?;

    match cli.command {
        Commands::Subjects => {
            let reference = config_bridge::load_reference(&resolved.config)?;
            subjects::list_subjects(&reference)?;
        },
        Commands::Run { subject } => {
            let (engine_config, reference) = engine_inputs(&resolved)?;
            run::run_once(engine_config, reference, subject).await?;
        },
        Commands::Demo {
            cycles,
            no_autoplay,
        } => {
            print_banner();
            let (engine_config, reference) = engine_inputs(&resolved)?;
            demo::run_demo(engine_config, reference, cycles, !no_autoplay).await?;
        },
        Commands::Config { command } => match command {
            ConfigCommands::Show { format } => config::show_config(&resolved, &format)?,
            ConfigCommands::Validate => config::validate_config(&resolved)?,
        },
    }

    Ok(())
}

fn engine_inputs(
    resolved: &ResolvedConfig,
) -> Result<(caseplay_engine::EngineConfig, Arc<caseplay_core::ReferenceData>)> {
    let engine_config = config_bridge::to_engine_config(&resolved.config)?;
    let reference = Arc::new(config_bridge::load_reference(&resolved.config)?);
    Ok((engine_config, reference))
}
