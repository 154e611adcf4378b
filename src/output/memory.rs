//! In-memory sink and sink fan-out

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::ExchangeRecord;
use crate::storage::RunStatus;

/// Collects emitted records in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<ExchangeRecord>,
    status: Option<RunStatus>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records emitted so far, in emission order
    pub fn records(&self) -> &[ExchangeRecord] {
        &self.records
    }

    /// Status passed to `finish`, if the run has ended
    pub fn status(&self) -> Option<RunStatus> {
        self.status
    }

    pub fn into_records(self) -> Vec<ExchangeRecord> {
        self.records
    }
}

impl RecordSink for MemorySink {
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()> {
        self.records.push(record.clone());
        Ok(())
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        self.status = Some(status);
        Ok(())
    }
}

/// Sends every emission to several sinks, in the order they were added
///
/// Both `emit` and `finish` reach every sink, even after one fails, and
/// report the first error.
#[derive(Default)]
pub struct SinkSet {
    sinks: Vec<Box<dyn RecordSink>>,
}

impl SinkSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sink to the end of the set
    pub fn push(&mut self, sink: impl RecordSink + 'static) {
        self.sinks.push(Box::new(sink));
    }
}

impl RecordSink for SinkSet {
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.emit(record) {
                tracing::error!("Failed to emit {}: {}", record.exchange, e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.finish(status) {
                tracing::error!("Failed to finish output: {}", e);
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
