//! `hx-agent` — vehicle and agent registries for the heat-exposure engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`vehicle`]  | `Vehicle`, `VehicleRegistry`, `Crossing` (credit apportioning) |
//! | [`agent`]    | `Agent` state machine, `AgentState`, `CloseOut`           |
//! | [`trip`]     | logical-leg accumulator, `Pricing`                        |
//! | [`registry`] | `AgentRegistry` (interning, dirty tracking, draining)     |
//! | [`record`]   | exported rows, `ExportBatch`, `RowCounts`                 |
//! | [`context`]  | `ExposureContext` — borrowed network/routes/rules         |
//! | [`error`]    | `AgentError`, `AgentResult<T>`                            |
//!
//! # Ownership
//!
//! Agents and vehicles live in plain `Vec` arenas indexed by their typed
//! ids; they refer to each other only by id.  The network and route table
//! are borrowed per call through [`ExposureContext`], never stored.

pub mod agent;
pub mod context;
pub mod error;
pub mod record;
pub mod registry;
pub mod trip;
pub mod vehicle;


pub use agent::{Agent, AgentState, CloseOut};
pub use context::ExposureContext;
pub use error::{AgentError, AgentResult};
pub use record::{ActivityRecord, AgentRecord, ExportBatch, LegRecord, RowCounts, SegmentRecord};
pub use registry::{AgentRegistry, CloseOutSummary};
pub use trip::Pricing;
pub use vehicle::{Crossing, Vehicle, VehicleRegistry};
