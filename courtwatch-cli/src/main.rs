//! CourtWatch CLI - Command-line interface
//!
//! Monitors court geofences from a stream of position samples and searches
//! the court catalog by name, attributes and distance.

mod commands;
mod error;
mod sink;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use courtwatch::config::ConfigFile;
use courtwatch::logging::{init_logging, LoggingConfig};

use commands::config::ConfigCommands;
use commands::monitor::MonitorArgs;
use commands::search::{SearchArgs, SuggestArgs};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "courtwatch", version, about = "Court geofence monitoring and search")]
struct Cli {
    /// Configuration file (defaults to ~/.courtwatch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Feed position samples through the geofence monitor
    Monitor(MonitorArgs),

    /// Search courts by name, attributes and distance
    Search(SearchArgs),

    /// Suggest court names for a partial query
    Suggest(SuggestArgs),

    /// Great-circle distance between two LAT,LON points
    Distance {
        /// First point as LAT,LON
        #[arg(allow_hyphen_values = true)]
        from: String,
        /// Second point as LAT,LON
        #[arg(allow_hyphen_values = true)]
        to: String,
    },

    /// View or change configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn load_config(path: Option<&PathBuf>) -> Result<ConfigFile, CliError> {
    match path {
        Some(path) => Ok(ConfigFile::load_from(path)?),
        None => Ok(ConfigFile::load()?),
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(cli.config.as_ref())?;

    let mut logging = LoggingConfig::from(&config.logging);
    if let Some(level) = cli.log_level {
        logging.level = level;
    }
    logging.ansi = console::colors_enabled_stderr();
    let _log_guard = init_logging(&logging)?;

    match cli.command {
        Commands::Monitor(args) => commands::monitor::run(args, &config),
        Commands::Search(args) => commands::search::run_search(args, &config),
        Commands::Suggest(args) => commands::search::run_suggest(args, &config),
        Commands::Distance { from, to } => commands::distance::run(&from, &to),
        Commands::Config(command) => commands::config::run(command, cli.config.as_deref()),
    }
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", console::style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}
