//! Agent/vehicle state-machine error type.

use thiserror::Error;

use crate::AgentState;

/// Violations of the itinerary or vehicle protocol.
///
/// All variants are fatal: they mean the event log is inconsistent with
/// itself, and no partial export is produced.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent {agent:?}: cannot {action} at t={time} while {state}")]
    InvalidTransition {
        agent:  String,
        action: &'static str,
        state:  AgentState,
        time:   f64,
    },

    #[error("agent {agent:?}: arrival by {found:?} but the open leg departed by {expected:?}")]
    ModeMismatch { agent: String, expected: String, found: String },

    #[error("agent {agent:?}: ending activity {found:?} but the open activity is {expected:?}")]
    ActivityMismatch { agent: String, expected: String, found: String },

    #[error("agent {agent:?}: {action} after the agent was aborted")]
    AfterAbort { agent: String, action: &'static str },

    #[error("vehicle {vehicle:?}: {detail}")]
    Vehicle { vehicle: String, detail: String },
}

pub type AgentResult<T> = Result<T, AgentError>;
