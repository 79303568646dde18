//! Read-only inputs shared by every state transition.

use hx_core::ModeRules;
use hx_spatial::{NetworkIndex, RouteTable};

/// Everything an agent operation needs to price an interval.
///
/// Built once per run by the processor and passed by reference; the
/// registries never hold on to it.
#[derive(Clone, Copy)]
pub struct ExposureContext<'a> {
    pub network:    &'a NetworkIndex,
    pub routes:     &'a RouteTable,
    pub modes:      &'a ModeRules,
    /// Run time assumed for the start of an agent's first activity.
    pub start_time: f64,
}

impl<'a> ExposureContext<'a> {
    pub fn new(network: &'a NetworkIndex, routes: &'a RouteTable, modes: &'a ModeRules, start_time: f64) -> Self {
        Self { network, routes, modes, start_time }
    }
}
