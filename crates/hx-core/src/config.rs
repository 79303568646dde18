//! Engine configuration.
//!
//! Typically loaded from the `[engine]` table of a TOML file by the
//! application crate (with the `serde` feature) and passed to the processor
//! builder.  Every field has a default, so an empty table is a valid config.

use std::collections::BTreeMap;

use crate::{CoreError, CoreResult, ModeRules};

/// Top-level configuration of one processing run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Run time (seconds) at which an agent's first activity is taken to
    /// have started when the log opens with that activity's end.
    pub start_time: f64,

    /// Time used to close out open itineraries at end of log.  `None` uses
    /// the timestamp of the last event.
    pub end_time: Option<f64>,

    /// Hand closed records to the sink every N events.  `0` flushes only at
    /// end of run.
    pub flush_interval: u64,

    /// Leg-mode / activity-type classification.
    pub modes: ModeRules,

    /// Fixed cabin temperature (°C) per vehicle type.  Vehicles whose type
    /// is absent here are exposed to the ambient temperature of their link.
    pub cabin_temperatures: BTreeMap<String, f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_time:         0.0,
            end_time:           None,
            flush_interval:     100_000,
            modes:              ModeRules::default(),
            cabin_temperatures: BTreeMap::new(),
        }
    }
}

impl EngineConfig {
    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.start_time.is_finite() || self.start_time < 0.0 {
            return Err(CoreError::Config(format!(
                "start_time must be a finite, non-negative number of seconds (got {})",
                self.start_time
            )));
        }
        if let Some(end) = self.end_time {
            if !end.is_finite() || end < self.start_time {
                return Err(CoreError::Config(format!(
                    "end_time {end} must be finite and not before start_time {}",
                    self.start_time
                )));
            }
        }
        for (kind, temp) in &self.cabin_temperatures {
            if !temp.is_finite() {
                return Err(CoreError::Config(format!(
                    "cabin temperature for vehicle type {kind:?} is not finite"
                )));
            }
        }
        if self.modes.terminal_activity_types.is_empty() {
            return Err(CoreError::Config(
                "modes.terminal_activity_types must name at least one activity type".into(),
            ));
        }
        Ok(())
    }

    /// Cabin temperature for a vehicle type, if one is configured.
    #[inline]
    pub fn cabin_temperature(&self, vehicle_type: &str) -> Option<f64> {
        self.cabin_temperatures.get(vehicle_type).copied()
    }
}
