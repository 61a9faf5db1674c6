//! Sentinel CLI
//!
//! Local execution entry point; schedule `sentinel run` with cron or similar,
//! one invocation at a time.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentinel::{
    error::Result,
    models::{Config, Source},
    pipeline::{self, Monitor},
    storage::{HistoryLedger, LocalStorage, StateStore},
    utils::http::HttpFetcher,
};

/// Sentinel - Web Page and Feed Change Monitor
#[derive(Parser, Debug)]
#[command(
    name = "sentinel",
    version,
    about = "Watches web pages and feeds for content changes"
)]
struct Cli {
    /// Directory holding configuration, state, history and the dashboard
    #[arg(short, long, default_value = ".")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check all sources, record changes and regenerate the dashboard
    Run,

    /// Regenerate the dashboard from existing history
    Report,

    /// Validate configuration and source files
    Validate,

    /// Show current state and history info
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("sentinel.toml");
    let config = Config::load_or_default(&config_path);
    log::debug!("Loaded configuration from {}", cli.storage_dir.display());

    let storage = LocalStorage::new(&cli.storage_dir, config.paths.clone());
    let sources_path = storage.path(&config.paths.sources);

    match cli.command {
        Command::Run => {
            let sources = Source::load_all(&sources_path)?;
            log::info!(
                "Loaded {} sources from {}",
                sources.len(),
                sources_path.display()
            );

            let fetcher = HttpFetcher::new(&config.fetch)?;
            let monitor = Monitor::new(&config, &storage, &fetcher);
            monitor.run(&sources).await?;

            log::info!(
                "Dashboard written to {}",
                storage.path(&config.paths.report).display()
            );
        }

        Command::Report => {
            let count = pipeline::regenerate_report(&config.report, &storage).await?;
            log::info!(
                "Dashboard rebuilt from {} history entries at {}",
                count,
                storage.path(&config.paths.report).display()
            );
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");

            let sources = Source::load_all(&sources_path)?;
            for source in &sources {
                if let Err(e) = source.validate() {
                    log::error!("Source {} is invalid: {}", source.url(), e);
                    return Err(e);
                }
            }
            log::info!("✓ Sources OK ({} entries)", sources.len());

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("Storage directory: {}", cli.storage_dir.display());

            let sources = Source::load_all(&sources_path)?;
            log::info!("Sources: {}", sources.len());
            for source in &sources {
                log::info!("    [{}] {}", source.kind(), source.url());
            }

            let state = storage.load_state().await?;
            log::info!("Tracked keys: {}", state.fingerprints.len());

            let history = storage.load_history().await?;
            match history.last() {
                Some(last) => log::info!(
                    "History: {} entries, last at {}",
                    history.len(),
                    last.timestamp
                ),
                None => log::info!("History: empty"),
            }
        }
    }

    Ok(())
}
