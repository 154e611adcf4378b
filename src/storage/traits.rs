//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::record::ExchangeRecord;
use crate::storage::{RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the scraper.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Lists all runs, newest first
    fn list_runs(&self) -> StorageResult<Vec<RunRecord>>;

    /// Sets a run's final status and finish timestamp
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Exchange Records =====

    /// Persists one emitted record and its market rows atomically
    ///
    /// # Returns
    ///
    /// The ID of the stored exchange record
    fn insert_exchange_record(&mut self, run_id: i64, record: &ExchangeRecord)
        -> StorageResult<i64>;

    /// Loads a run's records in emission order, market rows in row order
    fn load_exchange_records(&self, run_id: i64) -> StorageResult<Vec<ExchangeRecord>>;

    // ===== Statistics =====

    /// Number of runs recorded
    fn count_runs(&self) -> StorageResult<u64>;

    /// Number of exchange records stored for a run
    fn count_exchange_records(&self, run_id: i64) -> StorageResult<u64>;

    /// Number of market rows stored for a run
    fn count_market_rows(&self, run_id: i64) -> StorageResult<u64>;
}
