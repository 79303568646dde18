//! SQLite export backend (feature `sqlite`, on by default).
//!
//! Rows are staged in `staging_<table>` tables next to the canonical
//! `agents`, `activities`, `legs` and `segments`.  Publishing drops the
//! canonical tables and renames the staging tables in one transaction, so a
//! reader sees either the previous run or the new one.

use std::path::Path;

use log::info;
use rusqlite::{Connection, params};

use hx_agent::{ExportBatch, RowCounts};

use crate::row::Table;
use crate::store::ExportStore;
use crate::OutputResult;

fn schema(table: Table) -> &'static str {
    match table {
        Table::Agents => {
            "agent_id       TEXT    NOT NULL,
             itinerary_size INTEGER NOT NULL,
             total_exposure REAL    NOT NULL,
             aborted        INTEGER NOT NULL"
        }
        Table::Activities => {
            "agent_id   TEXT    NOT NULL,
             idx        INTEGER NOT NULL,
             kind       TEXT    NOT NULL,
             link       TEXT    NOT NULL,
             start_time REAL    NOT NULL,
             end_time   REAL,
             duration   REAL,
             exposure   REAL,
             aborted    INTEGER NOT NULL"
        }
        Table::Legs => {
            "leg_id     INTEGER NOT NULL,
             agent_id   TEXT    NOT NULL,
             idx        INTEGER NOT NULL,
             mode       TEXT    NOT NULL,
             start_link TEXT    NOT NULL,
             end_link   TEXT,
             start_time REAL    NOT NULL,
             end_time   REAL,
             duration   REAL,
             exposure   REAL,
             aborted    INTEGER NOT NULL"
        }
        Table::Segments => {
            "leg_id     INTEGER NOT NULL,
             idx        INTEGER NOT NULL,
             link       TEXT    NOT NULL,
             start_time REAL    NOT NULL,
             end_time   REAL    NOT NULL,
             exposure   REAL    NOT NULL"
        }
    }
}

/// Indexes created on the canonical tables after each publish.
const INDEXES: &str = "
    CREATE INDEX idx_activities_agent ON activities (agent_id);
    CREATE INDEX idx_legs_agent       ON legs (agent_id);
    CREATE INDEX idx_segments_leg     ON segments (leg_id);";

fn staging(table: Table) -> String {
    format!("staging_{}", table.name())
}

/// Stages and publishes records in an SQLite database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    pub fn open(path: &Path) -> OutputResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;",
        )?;
        Ok(Self { conn })
    }

    /// A private in-memory database.
    pub fn in_memory() -> OutputResult<Self> {
        Ok(Self { conn: Connection::open_in_memory()? })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl ExportStore for SqliteStore {
    fn reset_staging(&mut self) -> OutputResult<()> {
        self.drop_staging()?;
        for table in Table::ALL {
            self.conn
                .execute_batch(&format!("CREATE TABLE {} ({});", staging(table), schema(table)))?;
        }
        Ok(())
    }

    fn stage(&mut self, batch: &ExportBatch) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO staging_agents (agent_id, itinerary_size, total_exposure, aborted) \
                 VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in &batch.agents {
                stmt.execute(params![row.agent_id, row.itinerary_size, row.total_exposure, row.aborted])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO staging_activities \
                 (agent_id, idx, kind, link, start_time, end_time, duration, exposure, aborted) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for row in &batch.activities {
                stmt.execute(params![
                    row.agent_id,
                    row.idx,
                    row.kind,
                    row.link,
                    row.start,
                    row.end,
                    row.duration,
                    row.exposure,
                    row.aborted,
                ])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO staging_legs \
                 (leg_id, agent_id, idx, mode, start_link, end_link, start_time, end_time, duration, exposure, aborted) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in &batch.legs {
                stmt.execute(params![
                    row.leg_id,
                    row.agent_id,
                    row.idx,
                    row.mode,
                    row.start_link,
                    row.end_link,
                    row.start,
                    row.end,
                    row.duration,
                    row.exposure,
                    row.aborted,
                ])?;
            }

            let mut stmt = tx.prepare_cached(
                "INSERT INTO staging_segments (leg_id, idx, link, start_time, end_time, exposure) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for row in &batch.segments {
                stmt.execute(params![row.leg_id, row.idx, row.link, row.start, row.end, row.exposure])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn staged_counts(&mut self) -> OutputResult<RowCounts> {
        let mut counts = RowCounts::default();
        for table in Table::ALL {
            let n: i64 = self
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", staging(table)), [], |r| r.get(0))?;
            *table.count_mut(&mut counts) = n as u64;
        }
        Ok(counts)
    }

    fn publish(&mut self) -> OutputResult<()> {
        let tx = self.conn.transaction()?;
        for table in Table::ALL {
            tx.execute_batch(&format!(
                "DROP TABLE IF EXISTS {name};
                 ALTER TABLE {staging} RENAME TO {name};",
                name = table.name(),
                staging = staging(table),
            ))?;
        }
        tx.execute_batch(INDEXES)?;
        tx.commit()?;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        info!("published staging tables");
        Ok(())
    }

    fn drop_staging(&mut self) -> OutputResult<()> {
        for table in Table::ALL {
            self.conn
                .execute_batch(&format!("DROP TABLE IF EXISTS {};", staging(table)))?;
        }
        Ok(())
    }
}
