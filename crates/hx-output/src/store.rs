//! The `ExportStore` trait implemented by all backends.

use hx_agent::{ExportBatch, RowCounts};

use crate::OutputResult;

/// Storage with a staging area beside the canonical tables.
///
/// The [`Exporter`][crate::Exporter] drives a store through one run:
/// `reset_staging` → `stage`* → `staged_counts` → `publish` or
/// `drop_staging`.  Canonical tables are only ever touched by `publish`.
pub trait ExportStore {
    /// Drop whatever staging exists and create it empty.
    fn reset_staging(&mut self) -> OutputResult<()>;

    /// Append rows to staging.
    fn stage(&mut self, batch: &ExportBatch) -> OutputResult<()>;

    /// Rows currently in staging, read back from the store.
    fn staged_counts(&mut self) -> OutputResult<RowCounts>;

    /// Replace the canonical tables with staging.
    fn publish(&mut self) -> OutputResult<()>;

    /// Remove staging without publishing.  Idempotent.
    fn drop_staging(&mut self) -> OutputResult<()>;
}
