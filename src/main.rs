//! Bitdegree-Scraper main entry point
//!
//! This is the command-line interface for the bitdegree.org exchange scraper.

use bitdegree_scraper::config::{load_config_with_hash, Config};
use bitdegree_scraper::crawler::{crawl, exchange_targets};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Bitdegree-Scraper: exchange statistics collector
///
/// Walks bitdegree.org's overview and markets pages for BtcTurk Pro,
/// Binance TR and Paribu, and emits one record per exchange as a JSON line
/// (and optionally into a SQLite database).
#[derive(Parser, Debug)]
#[command(name = "bitdegree-scraper")]
#[command(version)]
#[command(about = "Collects exchange statistics from bitdegree.org", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary of the latest stored run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(&config, &config_hash).await?;
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
            0 => EnvFilter::new("bitdegree_scraper=info,warn"),
            1 => EnvFilter::new("bitdegree_scraper=debug,info"),
            2 => EnvFilter::new("bitdegree_scraper=trace,debug"),
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

/// Returns the configured database path or an error naming the mode that needs it
fn require_database<'a>(config: &'a Config, mode: &str) -> Result<&'a Path, String> {
    config
        .output
        .database_path
        .as_deref()
        .map(Path::new)
        .ok_or_else(|| format!("{} requires [output] database-path to be set", mode))
}

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Bitdegree-Scraper Dry Run ===\n");

    println!("User Agent: {}", config.user_agent.header_value());

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);
    println!("  Respect robots.txt: {}", config.http.respect_robots);

    println!("\nOutput:");
    println!("  JSON lines: {}", config.output.json_path);
    println!(
        "  Database: {}",
        config.output.database_path.as_deref().unwrap_or("(none)")
    );
    println!(
        "  Summary: {}",
        config.output.summary_path.as_deref().unwrap_or("(none)")
    );

    let targets = exchange_targets();
    println!("\nExchanges ({}):", targets.len());
    let mut page_count = 0;
    for target in &targets {
        println!(
            "  - {} [{}] ({} markets pages)",
            target.display_name, target.id, target.market_pages
        );
        println!("    * {}", target.overview_url()?);
        for page in 1..=target.market_pages {
            println!("    * {}", target.markets_url(page)?);
        }
        page_count += target.chain_len();
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would fetch {} pages", page_count);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use bitdegree_scraper::output::{load_statistics, print_statistics};
    use bitdegree_scraper::storage::SqliteStorage;

    let database_path = require_database(config, "--stats")?;
    println!("Database: {}\n", database_path.display());

    // Open the database
    let storage = SqliteStorage::new(database_path)?;

    // Load statistics
    let stats = load_statistics(&storage)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use bitdegree_scraper::output::{generate_markdown_summary, generate_summary};
    use bitdegree_scraper::storage::SqliteStorage;

    let database_path = require_database(config, "--export-summary")?;
    let summary_path = config
        .output
        .summary_path
        .as_deref()
        .ok_or("--export-summary requires [output] summary-path to be set")?;

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", database_path.display());
    println!("Output: {}", summary_path);
    println!();

    // Open the database
    let storage = SqliteStorage::new(database_path)?;

    // Generate summary from storage
    tracing::info!("Loading crawl data from database...");
    let summary = generate_summary(&storage)?;

    // Write markdown summary to file
    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(summary_path))?;

    println!("✓ Summary exported to: {}", summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("Writing records to {}", config.output.json_path);
    if let Some(database_path) = &config.output.database_path {
        tracing::info!("Persisting runs to {}", database_path);
    }

    // Run the crawler
    match crawl(config, config_hash).await {
        Ok(records) => {
            tracing::info!("Crawl completed successfully ({} exchanges)", records.len());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
