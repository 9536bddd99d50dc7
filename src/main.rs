//! Shelf-Crawler main entry point
//!
//! This is the command-line interface for the Shelf-Crawler catalog crawler.

use anyhow::{Context, Result};
use clap::Parser;
use shelf_crawler::config::{load_config_with_hash, validate, Config};
use shelf_crawler::output::{load_statistics, print_statistics};
use shelf_crawler::storage::open_storage;
use shelf_crawler::url::page_url;
use shelf_crawler::{run_crawl, ShelfError};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Shelf-Crawler: a paginated catalog crawler
///
/// Walks a fixed number of listing pages, extracts one record per listed
/// book and stores every record in a SQLite database and a CSV export.
#[derive(Parser, Debug)]
#[command(name = "shelf-crawler")]
#[command(version)]
#[command(about = "A paginated catalog crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Number of listing pages to crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// SQLite database path
    #[arg(long, value_name = "PATH")]
    database: Option<String>,

    /// CSV export path
    #[arg(long, value_name = "PATH")]
    export: Option<String>,

    /// Validate config and show the pages that would be fetched
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = load(cli.config.as_deref())?;

    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(database) = cli.database {
        config.output.database_path = database;
    }
    if let Some(export) = cli.export {
        config.output.export_path = export;
    }
    validate(&config).context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_crawler=info,warn"),
            1 => EnvFilter::new("shelf_crawler=debug,info"),
            2 => EnvFilter::new("shelf_crawler=trace,debug"),
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

fn load(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            Ok(config)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            Ok(Config::default())
        }
    }
}

/// Handles the --dry-run mode: prints the settings and every page URL
fn handle_dry_run(config: &Config) -> Result<()> {
    println!("=== Shelf-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Template: {}", config.crawler.start_url_template);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Concurrency: {}", config.crawler.concurrency);
    println!("  Request delay: {}ms", config.crawler.request_delay);
    println!("  Request timeout: {}s", config.crawler.request_timeout);
    println!(
        "  Allowed domain: {}",
        config.crawler.allowed_domain.as_deref().unwrap_or("(any)")
    );

    println!("\nUser Agent: {}", config.user_agent.agent);

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export: {}", config.output.export_path);

    println!("\nPages:");
    for page in 1..=config.crawler.max_pages {
        println!("  {}", page_url(&config.crawler.start_url_template, page)?);
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))
        .context("Failed to open database")?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> Result<()> {
    tracing::info!(
        "Writing to {} and {}",
        config.output.database_path,
        config.output.export_path
    );

    match run_crawl(config).await {
        Ok(summary) => {
            println!(
                "Crawled {} pages: {} items seen, {} records exported, {} stored, {} skipped",
                summary.pages_crawled,
                summary.items_seen,
                summary.records_exported,
                summary.records_stored,
                summary.items_skipped
            );
            Ok(())
        }
        Err(ShelfError::Aborted {
            last_persisted_page,
            items_seen,
            source,
        }) => {
            eprintln!(
                "Crawl aborted: pages 1..={} are fully persisted ({} items seen)",
                last_persisted_page, items_seen
            );
            Err(anyhow::Error::new(*source).context("Crawl aborted"))
        }
        Err(e) => Err(anyhow::Error::new(e).context("Crawl failed")),
    }
}
