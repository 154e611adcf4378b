//! SQLite-based record sink
//!
//! This module provides a sink that persists each emitted record under the
//! current run and closes the run with its final status.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::ExchangeRecord;
use crate::storage::{RunStatus, Storage};

/// Persists records to a storage backend under one run
pub struct SqliteSink<S: Storage> {
    storage: S,
    run_id: i64,
}

impl<S: Storage> SqliteSink<S> {
    /// Creates a new run in `storage` and a sink that writes to it
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `config_hash` - Hash of the configuration the run was started with
    pub fn start(mut storage: S, config_hash: &str) -> OutputResult<Self> {
        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Started run {}", run_id);
        Ok(Self { storage, run_id })
    }

    /// The run this sink writes to
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Read access to the backend
    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage> RecordSink for SqliteSink<S> {
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()> {
        let record_id = self.storage.insert_exchange_record(self.run_id, record)?;
        tracing::debug!(
            "Stored {} as record {} in run {}",
            record.exchange,
            record_id,
            self.run_id
        );
        Ok(())
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        self.storage.finish_run(self.run_id, status)?;
        tracing::info!("Run {} finished: {}", self.run_id, status);
        Ok(())
    }
}
