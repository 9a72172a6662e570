//! Driveward command-line interface.

pub mod commands;
pub mod logging;
pub mod prompt;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use driveward_core::config::Config;
use driveward_core::paths;

/// Driveward - consent-gated BitLocker password store
#[derive(Parser)]
#[command(name = "driveward")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, env = "DRIVEWARD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Save a drive password (prompts for hidden input)
    Save {
        /// Drive identifier, e.g. `D:`
        drive: String,

        /// Password. Visible in the process list and shell history; omit it
        /// to be prompted with hidden input instead.
        #[arg(long)]
        password: Option<String>,
    },

    /// Print the saved password for a drive
    Get {
        /// Drive identifier
        drive: String,
    },

    /// Remove the saved password for a drive
    Remove {
        /// Drive identifier
        drive: String,
    },

    /// Check whether a password is saved for a drive
    Has {
        /// Drive identifier
        drive: String,
    },

    /// List drives with saved passwords
    List,

    /// Show verifier availability and store location
    Status,

    /// Configuration management
    Config(commands::config::ConfigArgs),
}

/// Config file path: the `--config` value, or the default location.
pub fn config_path(explicit: Option<&Path>) -> anyhow::Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => paths::config_file().context("Failed to resolve config file location"),
    }
}

/// Load and validate the config at `path`. A missing file yields defaults.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = Config::load_or_default(path)
        .with_context(|| format!("Failed to load config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Run the CLI with the given arguments and loaded config.
pub async fn run(cli: Cli, config_file: PathBuf, config: Config) -> anyhow::Result<()> {
    use commands::passwords;

    match cli.command {
        Commands::Save { drive, password } => passwords::save(&config, &drive, password).await,
        Commands::Get { drive } => passwords::get(&config, &drive).await,
        Commands::Remove { drive } => passwords::remove(&config, &drive).await,
        Commands::Has { drive } => passwords::has(&config, &drive).await,
        Commands::List => passwords::list(&config).await,
        Commands::Status => commands::status::run(&config).await,
        Commands::Config(args) => commands::config::run(args, &config_file, &config),
    }
}
