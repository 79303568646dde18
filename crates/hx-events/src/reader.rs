//! Streaming CSV event-log reader.
//!
//! # CSV format
//!
//! One row per event, in non-decreasing time order.  Cells a given event
//! type does not use are left empty; columns other than `time` and `type`
//! may be omitted from the file entirely.
//!
//! ```csv
//! time,type,person,vehicle,link,actType,legMode,vehicleType
//! 21600,actend,p1,,L1,home,,
//! 21600,departure,p1,,L1,,car,
//! 21600,PersonEntersVehicle,p1,v1,,,,car
//! 21600,vehicle enters traffic,,v1,L1,,,
//! 21700,left link,,v1,L1,,,
//! ```
//!
//! Rows are decoded one at a time; the file is never held in memory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::{Event, EventError, EventResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct EventRecord {
    time: f64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    person: Option<String>,
    #[serde(default)]
    vehicle: Option<String>,
    #[serde(default)]
    link: Option<String>,
    #[serde(default, rename = "actType")]
    act_type: Option<String>,
    #[serde(default, rename = "legMode")]
    leg_mode: Option<String>,
    #[serde(default, rename = "vehicleType")]
    vehicle_type: Option<String>,
}

// ── EventReader ───────────────────────────────────────────────────────────────

/// Iterator over the events of a CSV log.
///
/// Yields `Err` for a malformed row; callers are expected to stop at the
/// first error.
pub struct EventReader<R: Read> {
    rows:   csv::DeserializeRecordsIntoIter<R, EventRecord>,
    record: u64,
}

impl EventReader<File> {
    /// Open an event log on disk.
    pub fn from_path(path: &Path) -> EventResult<Self> {
        Ok(Self::new(File::open(path)?))
    }
}

impl<R: Read> EventReader<R> {
    /// Read events from any `Read` source (a file, a decompressor, a byte
    /// slice in tests).
    pub fn new(reader: R) -> Self {
        let rows = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader)
            .into_deserialize();
        Self { rows, record: 0 }
    }

    /// Number of data rows consumed so far.
    pub fn records_read(&self) -> u64 {
        self.record
    }
}

impl<R: Read> Iterator for EventReader<R> {
    type Item = EventResult<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        self.record += 1;
        let record = self.record;
        Some(
            row.map_err(|e| EventError::Parse { record, message: e.to_string() })
                .and_then(|row| to_event(row, record)),
        )
    }
}

// ── Row decoding ──────────────────────────────────────────────────────────────

fn to_event(row: EventRecord, record: u64) -> EventResult<Event> {
    let EventRecord { time, kind, person, vehicle, link, act_type, leg_mode, vehicle_type } = row;
    if !time.is_finite() || time < 0.0 {
        return Err(EventError::Parse { record, message: format!("invalid time {time}") });
    }

    let need = |value: Option<String>, field: &'static str| -> EventResult<String> {
        value.filter(|v| !v.is_empty()).ok_or_else(|| EventError::MissingField {
            record,
            event_type: kind.clone(),
            field,
        })
    };
    let optional = |value: Option<String>| value.filter(|v| !v.is_empty());

    let event = match kind.as_str() {
        "actstart" => Event::ActivityStart {
            time,
            agent: need(person, "person")?,
            link:  need(link, "link")?,
            kind:  need(act_type, "actType")?,
        },
        "actend" => Event::ActivityEnd {
            time,
            agent: need(person, "person")?,
            link:  need(link, "link")?,
            kind:  need(act_type, "actType")?,
        },
        "departure" => Event::Departure {
            time,
            agent: need(person, "person")?,
            link:  need(link, "link")?,
            mode:  need(leg_mode, "legMode")?,
        },
        "arrival" => Event::Arrival {
            time,
            agent: need(person, "person")?,
            link:  need(link, "link")?,
            mode:  need(leg_mode, "legMode")?,
        },
        "PersonEntersVehicle" => Event::EntersVehicle {
            time,
            agent:        need(person, "person")?,
            vehicle:      need(vehicle, "vehicle")?,
            vehicle_type: optional(vehicle_type),
        },
        "PersonLeavesVehicle" => Event::LeavesVehicle {
            time,
            agent:   need(person, "person")?,
            vehicle: need(vehicle, "vehicle")?,
        },
        "entered link" | "vehicle enters traffic" => Event::EnteredLink {
            time,
            vehicle: need(vehicle, "vehicle")?,
            link:    need(link, "link")?,
        },
        "left link" | "vehicle leaves traffic" => Event::LeftLink {
            time,
            vehicle: need(vehicle, "vehicle")?,
            link:    need(link, "link")?,
        },
        "travelled" => Event::Travelled { time, agent: need(person, "person")? },
        "TransitDriverStarts" => Event::TransitDriverStarts {
            time,
            agent:   need(person, "person")?,
            vehicle: need(vehicle, "vehicle")?,
        },
        "stuckAndAbort" => Event::StuckAndAbort {
            time,
            agent: need(person, "person")?,
            mode:  optional(leg_mode),
        },
        _ => Event::Other { time, kind: kind.clone() },
    };
    Ok(event)
}
