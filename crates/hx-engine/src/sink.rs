//! Destination of closed records.

use std::convert::Infallible;

use hx_agent::{ExportBatch, RowCounts};

/// Receives each flushed [`ExportBatch`].
///
/// The processor calls `write_batch` every `flush_interval` events and once
/// more at end of run; the last batch is the only one carrying agent rows.
pub trait RecordSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn write_batch(&mut self, batch: ExportBatch) -> Result<(), Self::Error>;
}

/// Collects every batch in memory.  Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: ExportBatch,
    /// Number of `write_batch` calls.
    pub batches: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> RowCounts {
        self.records.counts()
    }
}

impl RecordSink for MemorySink {
    type Error = Infallible;

    fn write_batch(&mut self, mut batch: ExportBatch) -> Result<(), Infallible> {
        self.records.append(&mut batch);
        self.batches += 1;
        Ok(())
    }
}
