//! Output module for emitting records and generating crawl summaries
//!
//! This module handles:
//! - Emitting finished exchange records to sinks (JSON lines, SQLite, memory)
//! - Generating markdown summaries of crawl results
//! - Reporting per-run statistics from the results database

mod json;
mod markdown;
mod memory;
mod sqlite_output;
pub mod stats;
mod traits;

pub use json::JsonLinesSink;
pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use memory::{MemorySink, SinkSet};
pub use sqlite_output::SqliteSink;
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{CrawlSummary, OutputError, OutputResult, RecordSink};

use crate::storage::{RunRecord, Storage};
use crate::ScrapeError;
use chrono::{DateTime, Utc};

/// Seconds between two RFC 3339 timestamps, if both parse
pub(crate) fn duration_between(started_at: &str, finished_at: Option<&str>) -> Option<u64> {
    let started = started_at.parse::<DateTime<Utc>>().ok()?;
    let finished = finished_at?.parse::<DateTime<Utc>>().ok()?;
    u64::try_from((finished - started).num_seconds()).ok()
}

/// Builds the summary of a stored run
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
/// * `run` - The run to summarize
pub fn summarize_run(storage: &dyn Storage, run: RunRecord) -> Result<CrawlSummary, ScrapeError> {
    let records = storage.load_exchange_records(run.id)?;

    Ok(CrawlSummary {
        run_id: Some(run.id),
        duration_seconds: duration_between(&run.started_at, run.finished_at.as_deref()),
        started_at: run.started_at,
        finished_at: run.finished_at,
        status: run.status,
        config_hash: run.config_hash,
        records,
    })
}

/// Generates a crawl summary of the latest run in storage
///
/// # Arguments
///
/// * `storage` - The storage backend containing crawl data
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Successfully generated summary
/// * `Err(ScrapeError)` - No runs stored, or the query failed
pub fn generate_summary(storage: &dyn Storage) -> Result<CrawlSummary, ScrapeError> {
    let run = storage
        .get_latest_run()?
        .ok_or_else(|| OutputError::Write("No crawl runs found in database".to_string()))?;

    summarize_run(storage, run)
}
