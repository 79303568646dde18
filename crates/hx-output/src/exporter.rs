//! `Exporter<S>` — all-or-nothing export of one run.

use log::{info, warn};

use hx_agent::{ExportBatch, RowCounts};
use hx_engine::RecordSink;

use crate::row::Table;
use crate::store::ExportStore;
use crate::{OutputError, OutputResult};

/// Buffers flushed records into a store's staging area and publishes them
/// only if the staged row counts check out.
///
/// Implements [`RecordSink`], so it can be handed straight to
/// `EventProcessor::run`.
///
/// ```rust,ignore
/// let mut exporter = Exporter::begin(SqliteStore::open(path)?, 10_000)?;
/// match processor.run(events, &mut exporter, &mut observer) {
///     Ok(summary) => { exporter.commit(summary.rows)?; }
///     Err(e) => { exporter.discard()?; return Err(e.into()); }
/// }
/// ```
pub struct Exporter<S: ExportStore> {
    store:           S,
    batch_rows:      u64,
    pending:         ExportBatch,
    submitted:       RowCounts,
    expected_agents: Option<u64>,
}

impl<S: ExportStore> Exporter<S> {
    /// Start an export into fresh staging.  Staging left over from an
    /// earlier, uncommitted run is dropped first.
    ///
    /// Rows are written to staging whenever at least `batch_rows` are
    /// buffered.
    pub fn begin(mut store: S, batch_rows: u64) -> OutputResult<Self> {
        store.reset_staging()?;
        Ok(Self {
            store,
            batch_rows: batch_rows.max(1),
            pending: ExportBatch::default(),
            submitted: RowCounts::default(),
            expected_agents: None,
        })
    }

    /// Also require exactly `agents` agent rows at commit (the population
    /// size, when it is known up front).
    pub fn expect_agents(&mut self, agents: u64) {
        self.expected_agents = Some(agents);
    }

    /// Rows submitted so far, staged or buffered.
    pub fn submitted(&self) -> RowCounts {
        self.submitted
    }

    pub fn push(&mut self, mut batch: ExportBatch) -> OutputResult<()> {
        self.submitted += batch.counts();
        self.pending.append(&mut batch);
        if self.pending.counts().total() >= self.batch_rows {
            self.write_pending()?;
        }
        Ok(())
    }

    fn write_pending(&mut self) -> OutputResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.store.stage(&self.pending)?;
        self.pending = ExportBatch::default();
        Ok(())
    }

    /// Verify staging against the submitted rows and `expected`, then
    /// publish it.  Returns the published row counts.
    ///
    /// On any mismatch staging is discarded and
    /// [`OutputError::Inconsistent`] is returned; canonical storage is left
    /// as it was.
    pub fn commit(mut self, expected: RowCounts) -> OutputResult<RowCounts> {
        self.write_pending()?;
        let staged = self.store.staged_counts()?;

        if let Err(e) = self.check(&staged, &expected) {
            warn!("discarding staged export: {e}");
            self.store.drop_staging()?;
            return Err(e);
        }

        self.store.publish()?;
        info!(
            "export committed: {} agents, {} activities, {} legs, {} segments",
            staged.agents, staged.activities, staged.legs, staged.segments
        );
        Ok(staged)
    }

    fn check(&self, staged: &RowCounts, expected: &RowCounts) -> OutputResult<()> {
        for table in Table::ALL {
            let staged = table.count(staged);
            for wanted in [table.count(&self.submitted), table.count(expected)] {
                if staged != wanted {
                    return Err(OutputError::Inconsistent { table: table.name(), expected: wanted, staged });
                }
            }
        }
        if let Some(wanted) = self.expected_agents {
            if staged.agents != wanted {
                return Err(OutputError::Inconsistent {
                    table: Table::Agents.name(),
                    expected: wanted,
                    staged: staged.agents,
                });
            }
        }
        Ok(())
    }

    /// Abandon the export, dropping staging.
    pub fn discard(mut self) -> OutputResult<()> {
        self.store.drop_staging()
    }
}

impl<S: ExportStore> RecordSink for Exporter<S> {
    type Error = OutputError;

    fn write_batch(&mut self, batch: ExportBatch) -> OutputResult<()> {
        self.push(batch)
    }
}
