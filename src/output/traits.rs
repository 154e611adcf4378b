//! Output sink traits and types
//!
//! This module defines the trait interface for record sinks and
//! associated data structures for crawl summaries.

use crate::record::ExchangeRecord;
use crate::storage::RunStatus;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Destination for finished exchange records
///
/// Records arrive one at a time, in exchange order, as soon as each chain
/// completes. A sink must not reorder or merge them.
pub trait RecordSink {
    /// Emits one finished record
    ///
    /// # Arguments
    ///
    /// * `record` - The record to emit, tagged by its exchange id
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()>;

    /// Finalizes the output once the run ends
    ///
    /// # Arguments
    ///
    /// * `status` - The final status of the crawl run
    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        let _ = status;
        Ok(())
    }
}

impl<T: RecordSink + ?Sized> RecordSink for Box<T> {
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()> {
        (**self).emit(record)
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        (**self).finish(status)
    }
}

/// Summary of one crawl run
#[derive(Debug, Clone)]
pub struct CrawlSummary {
    // Run metadata
    pub run_id: Option<i64>,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub duration_seconds: Option<u64>,
    pub status: RunStatus,
    pub config_hash: String,

    /// Emitted records, in emission order
    pub records: Vec<ExchangeRecord>,
}

impl CrawlSummary {
    /// Total market rows across all records
    pub fn total_market_rows(&self) -> usize {
        self.records.iter().map(ExchangeRecord::market_count).sum()
    }

    /// Market rows with at least one missing cell
    pub fn incomplete_rows(&self) -> usize {
        self.records
            .iter()
            .flat_map(|record| record.markets.iter())
            .filter(|row| row.has_missing_fields())
            .count()
    }
}
