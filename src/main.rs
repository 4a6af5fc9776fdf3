//! Site-Crawler main entry point
//!
//! This is the command-line interface for the single-site crawler.

use anyhow::Context;
use clap::Parser;
use site_crawler::config::{load_config_with_hash, validate, Config};
use site_crawler::crawler::run_crawl;
use site_crawler::output::{print_summary, write_csv_report};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Site-Crawler: crawl one website and report what it contains
///
/// Starting from URL, every page reachable through links on the same domain
/// is fetched (up to a page budget) and summarized. Optionally the
/// successful pages are exported as CSV.
#[derive(Parser, Debug)]
#[command(name = "site-crawler")]
#[command(version)]
#[command(about = "A concurrent single-site crawler", long_about = None)]
struct Cli {
    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// Maximum number of simultaneous fetches [default: 5]
    #[arg(long, value_name = "N")]
    max_concurrency: Option<u32>,

    /// Maximum number of pages to crawl [default: 100]
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Total timeout for each request, in seconds [default: 10]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write successful pages to this CSV file
    #[arg(long, value_name = "FILE")]
    csv: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    tracing::info!(
        "Max concurrency: {}, max pages: {}, request timeout: {}s",
        config.crawler.max_concurrency,
        config.crawler.max_pages,
        config.crawler.request_timeout_secs
    );

    let result = run_crawl(&config, &cli.url)
        .await
        .with_context(|| format!("Failed to crawl {}", cli.url))?;

    if !cli.quiet {
        print_summary(&result);
    }

    let csv_path = cli
        .csv
        .clone()
        .or_else(|| config.output.csv_path.as_ref().map(PathBuf::from));

    if let Some(path) = csv_path {
        let rows = write_csv_report(&result, &path)
            .with_context(|| format!("Failed to write CSV report to {}", path.display()))?;
        if !cli.quiet {
            println!("\nCSV report written to: {}", path.display());
            println!("Total pages exported: {}", rows);
        }
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_crawler=info,warn"),
            1 => EnvFilter::new("site_crawler=debug,info"),
            2 => EnvFilter::new("site_crawler=trace,debug"),
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

/// Loads the config file (if any) and applies command-line overrides
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    if let Some(max_concurrency) = cli.max_concurrency {
        config.crawler.max_concurrency = max_concurrency;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }

    validate(&config).context("Invalid crawl settings")?;
    Ok(config)
}
