//! Driveward CLI entry point.

use clap::Parser;
use driveward_cli::{config_path, load_config, logging, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_file = config_path(cli.config.as_deref())?;
    let config = load_config(&config_file)?;

    logging::init(&config.logging, cli.verbose);

    run(cli, config_file, config).await
}
