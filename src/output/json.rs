//! JSON-lines record sink
//!
//! Each emitted record becomes one line of the form
//! `{"<exchange>": {<overview fields>, "markets": [...]}}`, written and
//! flushed immediately so a failed run keeps every record emitted before it.

use crate::output::traits::{OutputResult, RecordSink};
use crate::record::ExchangeRecord;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one tagged JSON object per line
pub struct JsonLinesSink<W: Write> {
    writer: W,
    emitted: usize,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Creates (or truncates) the feed file at `path`
    pub fn create(path: &Path) -> OutputResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    /// Wraps any writer
    pub fn new(writer: W) -> Self {
        Self { writer, emitted: 0 }
    }

    /// Number of records written so far
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &ExchangeRecord) -> OutputResult<()> {
        let line = serde_json::to_string(&record.to_tagged_json()?)?;
        self.writer.write_all(line.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.emitted += 1;
        Ok(())
    }
}
