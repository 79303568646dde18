//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `hx-spatial`.
///
/// Every variant is fatal for a run: the engine assumes the network, the
/// profile assignment, and the route table are complete before the first
/// event is read.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("link {0:?} not found in network")]
    UnknownLink(String),

    #[error("node {0:?} not found in network")]
    UnknownNode(String),

    #[error("temperature profile {0:?} has no centroid")]
    UnknownProfile(String),

    #[error("duplicate {kind} id {name:?}")]
    DuplicateId { kind: &'static str, name: String },

    #[error("link {link:?} has no reachable temperature profile")]
    NoProfile { link: String },

    #[error("link {link:?}: nearest temperature profile {profile:?} is {distance:.1} away (limit {limit:.1})")]
    ProfileTooFar {
        link:     String,
        profile:  String,
        distance: f64,
        limit:    f64,
    },

    #[error("temperature profile {name:?} is invalid: {reason}")]
    InvalidProfile { name: String, reason: String },

    #[error("spatial parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
