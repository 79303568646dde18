//! CSV export backend.
//!
//! The export directory `<dir>` holds one file per table:
//! `agents.csv`, `activities.csv`, `legs.csv`, `segments.csv`.  A run is
//! staged in the sibling directory `<dir>.staging` and published by moving
//! the old directory aside, renaming staging into place, and removing the
//! old copy.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use csv::Writer;
use log::{info, warn};

use hx_agent::{ExportBatch, RowCounts};

use crate::row::Table;
use crate::store::ExportStore;
use crate::{OutputError, OutputResult};

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn flag(value: bool) -> String {
    (value as u8).to_string()
}

/// Open writers of the staging directory.
struct StagingFiles {
    agents:     Writer<File>,
    activities: Writer<File>,
    legs:       Writer<File>,
    segments:   Writer<File>,
}

impl StagingFiles {
    fn create(dir: &Path) -> OutputResult<Self> {
        let open = |table: Table| -> OutputResult<Writer<File>> {
            let mut w = Writer::from_path(dir.join(format!("{}.csv", table.name())))?;
            w.write_record(table.columns())?;
            Ok(w)
        };
        Ok(Self {
            agents:     open(Table::Agents)?,
            activities: open(Table::Activities)?,
            legs:       open(Table::Legs)?,
            segments:   open(Table::Segments)?,
        })
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.agents.flush()?;
        self.activities.flush()?;
        self.legs.flush()?;
        self.segments.flush()?;
        Ok(())
    }
}

/// Stages and publishes records as a directory of CSV files.
pub struct CsvStore {
    dir:     PathBuf,
    staging: PathBuf,
    files:   Option<StagingFiles>,
}

impl CsvStore {
    /// Export into `dir`.  Neither `dir` nor its parent need exist yet.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let Some(name) = dir.file_name() else {
            return Err(OutputError::State(format!("{} does not name a directory", dir.display())));
        };
        let mut staging = name.to_os_string();
        staging.push(".staging");
        Ok(Self { dir: dir.to_path_buf(), staging: dir.with_file_name(staging), files: None })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging
    }

    fn files(&mut self) -> OutputResult<&mut StagingFiles> {
        self.files
            .as_mut()
            .ok_or_else(|| OutputError::State("CSV staging is not open".into()))
    }
}

impl ExportStore for CsvStore {
    fn reset_staging(&mut self) -> OutputResult<()> {
        self.drop_staging()?;
        fs::create_dir_all(&self.staging)?;
        self.files = Some(StagingFiles::create(&self.staging)?);
        Ok(())
    }

    fn stage(&mut self, batch: &ExportBatch) -> OutputResult<()> {
        let files = self.files()?;
        for row in &batch.agents {
            files.agents.write_record(&[
                row.agent_id.clone(),
                row.itinerary_size.to_string(),
                row.total_exposure.to_string(),
                flag(row.aborted),
            ])?;
        }
        for row in &batch.activities {
            files.activities.write_record(&[
                row.agent_id.clone(),
                row.idx.to_string(),
                row.kind.clone(),
                row.link.clone(),
                row.start.to_string(),
                opt(row.end),
                opt(row.duration),
                opt(row.exposure),
                flag(row.aborted),
            ])?;
        }
        for row in &batch.legs {
            files.legs.write_record(&[
                row.leg_id.to_string(),
                row.agent_id.clone(),
                row.idx.to_string(),
                row.mode.clone(),
                row.start_link.clone(),
                row.end_link.clone().unwrap_or_default(),
                row.start.to_string(),
                opt(row.end),
                opt(row.duration),
                opt(row.exposure),
                flag(row.aborted),
            ])?;
        }
        for row in &batch.segments {
            files.segments.write_record(&[
                row.leg_id.to_string(),
                row.idx.to_string(),
                row.link.clone(),
                row.start.to_string(),
                row.end.to_string(),
                row.exposure.to_string(),
            ])?;
        }
        Ok(())
    }

    fn staged_counts(&mut self) -> OutputResult<RowCounts> {
        self.files()?.flush()?;
        let mut counts = RowCounts::default();
        for table in Table::ALL {
            let mut reader = csv::Reader::from_path(self.staging.join(format!("{}.csv", table.name())))?;
            let mut n = 0;
            for record in reader.records() {
                record?;
                n += 1;
            }
            *table.count_mut(&mut counts) = n;
        }
        Ok(counts)
    }

    fn publish(&mut self) -> OutputResult<()> {
        let Some(mut files) = self.files.take() else {
            return Err(OutputError::State("CSV staging is not open".into()));
        };
        files.flush()?;
        drop(files);

        swap_into_place(&self.staging, &self.dir)?;
        info!("published {}", self.dir.display());
        Ok(())
    }

    fn drop_staging(&mut self) -> OutputResult<()> {
        self.files = None;
        if self.staging.exists() {
            fs::remove_dir_all(&self.staging)?;
        }
        Ok(())
    }
}

/// Replace `dir` with `staging`.
///
/// The previous `dir` is moved to `<staging>.old` first and put back if
/// `staging` cannot be moved into place.
pub(crate) fn swap_into_place(staging: &Path, dir: &Path) -> OutputResult<()> {
    let mut old = staging.to_path_buf().into_os_string();
    old.push(".old");
    let old = PathBuf::from(old);
    if old.exists() {
        fs::remove_dir_all(&old)?;
    }
    let moved_aside = dir.exists();
    if moved_aside {
        fs::rename(dir, &old)?;
    }
    if let Err(e) = fs::rename(staging, dir) {
        if moved_aside {
            if let Err(restore) = fs::rename(&old, dir) {
                warn!("could not restore {} from {}: {restore}", dir.display(), old.display());
            }
        }
        return Err(e.into());
    }
    if old.exists() {
        fs::remove_dir_all(&old)?;
    }
    Ok(())
}
