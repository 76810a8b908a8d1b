use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wd_cli::commands::{add, list, summary, sync};
use wd_cli::{Cli, Commands, Config};
use wd_store::{LogService, Store};

/// Load config and open the store, creating the data directory if needed.
fn open_log(config_path: Option<&Path>) -> Result<(LogService, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let store = Store::open(config.store_config()?).context("failed to open history store")?;
    Ok((LogService::new(store), config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let (log, config) = open_log(cli.config.as_deref())?;
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Add(args) => {
            add::run(&mut stdout, &log, args)?;
        }
        Commands::List(args) => list::run(&mut stdout, &log, args)?,
        Commands::Summary(args) => summary::run(&mut stdout, &log, args)?,
        Commands::Sync(args) => {
            sync::run(&mut stdout, &log, args, &config)?;
        }
    }

    Ok(())
}
