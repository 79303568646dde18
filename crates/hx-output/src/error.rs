//! Error types for hx-output.

use thiserror::Error;

/// Errors that can occur while staging or publishing an export.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Staged rows disagree with what was submitted or expected.  Staging
    /// has been discarded and canonical storage is untouched.
    #[error("export of {table} is inconsistent: expected {expected} rows, staged {staged}")]
    Inconsistent {
        table:    &'static str,
        expected: u64,
        staged:   u64,
    },

    #[error("export store misuse: {0}")]
    State(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
