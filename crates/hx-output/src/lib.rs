//! `hx-output` — staged, all-or-nothing export of heat-exposure records.
//!
//! Two backends are provided:
//!
//! | Feature            | Backend  | Canonical storage                                  |
//! |--------------------|----------|----------------------------------------------------|
//! | *(none)*           | CSV      | `<dir>/{agents,activities,legs,segments}.csv`      |
//! | `sqlite` (default) | SQLite   | tables `agents`, `activities`, `legs`, `segments`  |
//!
//! Both implement [`ExportStore`] and are driven by [`Exporter`], which
//! implements `hx_engine::RecordSink`.  A run writes only to staging; the
//! canonical tables are replaced in one step at [`Exporter::commit`], after
//! the staged row counts have been checked.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hx_output::{Exporter, SqliteStore};
//!
//! let mut exporter = Exporter::begin(SqliteStore::open(Path::new("exposure.db"))?, 10_000)?;
//! let summary = processor.run(events, &mut exporter, &mut NoopObserver)?;
//! exporter.commit(summary.rows)?;
//! ```

pub mod csv;
pub mod error;
pub mod exporter;
pub mod row;
pub mod store;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(test)]
mod tests;

pub use crate::csv::CsvStore;
pub use error::{OutputError, OutputResult};
pub use exporter::Exporter;
pub use row::Table;
pub use store::ExportStore;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
