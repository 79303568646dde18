//! Event-log error type.

use thiserror::Error;

/// Errors produced while reading the event log.
///
/// `record` is the 1-based data row number (the header is not counted).
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event log record {record}: {message}")]
    Parse { record: u64, message: String },

    #[error("event log record {record}: {event_type:?} event has no {field:?}")]
    MissingField {
        record:     u64,
        event_type: String,
        field:      &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EventResult<T> = Result<T, EventError>;
