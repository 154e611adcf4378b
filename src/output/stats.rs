//! Statistics generation from the results database
//!
//! This module provides functionality for extracting and displaying
//! per-run statistics from the storage layer.

use crate::storage::{RunRecord, Storage, StorageResult};

/// Counts for a single run
#[derive(Debug, Clone)]
pub struct RunStatistics {
    pub run: RunRecord,

    /// Exchange records emitted in this run
    pub exchanges: u64,

    /// Market rows across those records
    pub market_rows: u64,
}

/// Statistics across all stored runs
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of runs recorded
    pub total_runs: u64,

    /// Per-run counts, newest first
    pub runs: Vec<RunStatistics>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    let total_runs = storage.count_runs()?;

    let runs = storage
        .list_runs()?
        .into_iter()
        .map(|run| {
            Ok(RunStatistics {
                exchanges: storage.count_exchange_records(run.id)?,
                market_rows: storage.count_market_rows(run.id)?,
                run,
            })
        })
        .collect::<StorageResult<Vec<_>>>()?;

    Ok(CrawlStatistics { total_runs, runs })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");
    println!("Runs recorded: {}", stats.total_runs);
    println!();

    if stats.runs.is_empty() {
        println!("No runs found.");
        return;
    }

    println!(
        "{:>5}  {:<10}  {:>9}  {:>11}  {}",
        "Run", "Status", "Exchanges", "Market rows", "Started"
    );
    for entry in &stats.runs {
        println!(
            "{:>5}  {:<10}  {:>9}  {:>11}  {}",
            entry.run.id, entry.run.status, entry.exchanges, entry.market_rows, entry.run.started_at
        );
    }
}
