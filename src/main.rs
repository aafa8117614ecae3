//! Creole main entry point
//!
//! This is the command-line interface for the Creole crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use creole::config::{load_config_with_hash, validate, Config};
use creole::crawler::{Engine, Fetcher};
use creole::output::print_report;
use creole::url::normalize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Creole: a polite single-origin web crawler
///
/// Creole crawls every page reachable from a seed URL on the seed's own
/// origin, respecting robots.txt and a per-host delay, and keeps each page in
/// a local content store so later runs can skip the network.
#[derive(Parser, Debug)]
#[command(name = "creole")]
#[command(version)]
#[command(about = "A polite single-origin web crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Content store directory (overrides the config file)
    #[arg(short = 'd', long, global = true, value_name = "DIR", alias = "dir")]
    store: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every same-origin page reachable from URL
    Crawl {
        /// Seed URL; a missing scheme defaults to http
        url: String,

        /// Minimum delay between requests to one host, in milliseconds
        #[arg(long, value_name = "N")]
        throttle_ms: Option<u64>,
    },

    /// Download a single page into the content store
    Fetch {
        /// Page URL; a missing scheme defaults to http
        url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = load_configuration(cli.config.as_ref())?;
    if let Some(store) = &cli.store {
        config.store.root = store.to_string_lossy().into_owned();
    }

    match cli.command {
        Command::Crawl { url, throttle_ms } => {
            if let Some(ms) = throttle_ms {
                config.crawler.throttle_delay = ms;
            }
            validate(&config).context("Invalid configuration")?;
            handle_crawl(&config, &url).await
        }
        Command::Fetch { url } => {
            validate(&config).context("Invalid configuration")?;
            handle_fetch(&config, &url).await
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("creole=info,warn"),
            1 => EnvFilter::new("creole=debug,info"),
            2 => EnvFilter::new("creole=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file if one was given, defaults otherwise
fn load_configuration(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);

    Ok(config)
}

/// Handles the crawl subcommand
async fn handle_crawl(config: &Config, url: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Store: {}, throttle: {}ms",
        config.store.root,
        config.crawler.throttle_delay
    );

    let mut engine = Engine::new(config).context("Failed to set up the crawler")?;
    let report = engine
        .crawl(url)
        .await
        .with_context(|| format!("Crawl from {} failed", url))?;

    print_report(&report);
    Ok(())
}

/// Handles the fetch subcommand: one robots-checked download, stored like a crawled page
async fn handle_fetch(config: &Config, url: &str) -> anyhow::Result<()> {
    let url = normalize(url, None).with_context(|| format!("Invalid URL: {}", url))?;

    let mut fetcher = Fetcher::new(config).context("Failed to set up the fetcher")?;
    let document = fetcher
        .download(&url)
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    println!(
        "Stored {} ({} bytes) in {}",
        document.final_url,
        document.body.len(),
        config.store.root
    );
    Ok(())
}
