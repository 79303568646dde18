use hx_agent::AgentError;
use hx_core::CoreError;
use hx_events::EventError;
use hx_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("event at t={time} is earlier than the previous event at t={previous}")]
    TimeRegression { previous: f64, time: f64 },

    #[error("record sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type EngineResult<T> = Result<T, EngineError>;
