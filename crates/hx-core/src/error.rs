//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! operation (usually config validation) can fail on their path.

use thiserror::Error;

/// The error type for `hx-core`.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for `hx-core`.
pub type CoreResult<T> = Result<T, CoreError>;
