//! The typed event vocabulary.
//!
//! One variant per simulator event type the engine reacts to.  Identifiers
//! stay as the simulator's strings; interning to typed ids happens in the
//! registries, so the event layer has no knowledge of the network.

/// A single entry of the simulator event log.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    ActivityStart { time: f64, agent: String, link: String, kind: String },
    ActivityEnd   { time: f64, agent: String, link: String, kind: String },
    Departure     { time: f64, agent: String, link: String, mode: String },
    Arrival       { time: f64, agent: String, link: String, mode: String },
    EntersVehicle {
        time:         f64,
        agent:        String,
        vehicle:      String,
        /// Explicit vehicle type, used to look up a fixed cabin temperature.
        vehicle_type: Option<String>,
    },
    LeavesVehicle { time: f64, agent: String, vehicle: String },
    EnteredLink   { time: f64, vehicle: String, link: String },
    LeftLink      { time: f64, vehicle: String, link: String },
    /// End-of-teleport marker.  Carries no exposure of its own.
    Travelled     { time: f64, agent: String },
    /// The agent drives a transit vehicle and is not a passenger.
    TransitDriverStarts { time: f64, agent: String, vehicle: String },
    StuckAndAbort { time: f64, agent: String, mode: Option<String> },
    /// Any event type the engine does not interpret.
    Other         { time: f64, kind: String },
}

impl Event {
    /// Timestamp in run seconds.
    pub fn time(&self) -> f64 {
        match self {
            Event::ActivityStart { time, .. }
            | Event::ActivityEnd { time, .. }
            | Event::Departure { time, .. }
            | Event::Arrival { time, .. }
            | Event::EntersVehicle { time, .. }
            | Event::LeavesVehicle { time, .. }
            | Event::EnteredLink { time, .. }
            | Event::LeftLink { time, .. }
            | Event::Travelled { time, .. }
            | Event::TransitDriverStarts { time, .. }
            | Event::StuckAndAbort { time, .. }
            | Event::Other { time, .. } => *time,
        }
    }

    /// The person the event is about, if any.
    pub fn agent(&self) -> Option<&str> {
        match self {
            Event::ActivityStart { agent, .. }
            | Event::ActivityEnd { agent, .. }
            | Event::Departure { agent, .. }
            | Event::Arrival { agent, .. }
            | Event::EntersVehicle { agent, .. }
            | Event::LeavesVehicle { agent, .. }
            | Event::Travelled { agent, .. }
            | Event::TransitDriverStarts { agent, .. }
            | Event::StuckAndAbort { agent, .. } => Some(agent),
            Event::EnteredLink { .. } | Event::LeftLink { .. } | Event::Other { .. } => None,
        }
    }

    /// Short name for log lines and diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Event::ActivityStart { .. } => "actstart",
            Event::ActivityEnd { .. } => "actend",
            Event::Departure { .. } => "departure",
            Event::Arrival { .. } => "arrival",
            Event::EntersVehicle { .. } => "PersonEntersVehicle",
            Event::LeavesVehicle { .. } => "PersonLeavesVehicle",
            Event::EnteredLink { .. } => "entered link",
            Event::LeftLink { .. } => "left link",
            Event::Travelled { .. } => "travelled",
            Event::TransitDriverStarts { .. } => "TransitDriverStarts",
            Event::StuckAndAbort { .. } => "stuckAndAbort",
            Event::Other { kind, .. } => kind,
        }
    }
}
