use stargaze::cli::{self, Cli};
use stargaze::config::{self, StargazeConfig};

use anyhow::Result;
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration, then layer command-line overrides on top
    let (mut loaded, found) = StargazeConfig::load_or_default(&cli.config)?;
    cli.apply_overrides(&mut loaded);
    let config = config::set_config(loaded);

    // Initialize logging
    let _logging_guard = stargaze::logging::init_logging(
        &config.log_dir,
        "stargaze",
        &config.log_level,
    )?;

    if found {
        tracing::info!("Loaded configuration from {}", cli.config.display());
    } else {
        tracing::info!("No configuration at {}, using built-in defaults", cli.config.display());
    }

    cli::run(&cli.command, config).await
}
