//! The `EventProcessor` and its single forward pass.

use log::{debug, info};

use hx_agent::{AgentRegistry, ExposureContext, RowCounts, VehicleRegistry};
use hx_core::EngineConfig;
use hx_events::{Event, EventResult};
use hx_spatial::{NetworkIndex, RouteTable};

use crate::{EngineError, EngineResult, ProcessObserver, RecordSink};

// ── RunSummary ────────────────────────────────────────────────────────────────

/// Totals of one completed run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunSummary {
    /// Events read from the log.
    pub events:          u64,
    /// Events with no effect: uninterpreted types and transit-driver events.
    pub ignored:         u64,
    /// Passenger agents seen (transit drivers excluded).
    pub agents:          usize,
    pub drivers:         usize,
    pub vehicles:        usize,
    /// Agents whose itinerary ended in a terminal activity or was still
    /// open in one at end of log.
    pub closed_normally: u64,
    pub aborted:         u64,
    /// Un-simulated sub-legs priced without a route.
    pub route_misses:    u64,
    /// Time used to close out open itineraries.
    pub final_time:      f64,
    /// Rows handed to the sink, per table.
    pub rows:            RowCounts,
}

// ── EventProcessor ────────────────────────────────────────────────────────────

/// Applies an event log to the agent and vehicle registries.
///
/// The network and route table are borrowed for the whole run; the
/// registries are owned.  [`run`](Self::run) consumes the processor, so a
/// processor makes exactly one pass.
///
/// Create via [`ProcessorBuilder`][crate::ProcessorBuilder].
pub struct EventProcessor<'a> {
    config:    EngineConfig,
    network:   &'a NetworkIndex,
    routes:    Option<&'a RouteTable>,
    /// Stand-in when no route table was supplied.
    no_routes: RouteTable,
    agents:    AgentRegistry,
    vehicles:  VehicleRegistry,
    last_time: Option<f64>,
    events:    u64,
    ignored:   u64,
    rows:      RowCounts,
}

impl<'a> EventProcessor<'a> {
    pub(crate) fn new(config: EngineConfig, network: &'a NetworkIndex, routes: Option<&'a RouteTable>) -> Self {
        Self {
            config,
            network,
            routes,
            no_routes: RouteTable::new(),
            agents:    AgentRegistry::new(),
            vehicles:  VehicleRegistry::new(),
            last_time: None,
            events:    0,
            ignored:   0,
            rows:      RowCounts::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ── Public API ────────────────────────────────────────────────────────

    /// Process every event, close out open itineraries and flush the
    /// remaining records.
    ///
    /// Stops at the first error: a malformed event, a time regression, an
    /// unknown link, an itinerary or vehicle protocol violation, or a sink
    /// failure.  Records already handed to `sink` are then incomplete and
    /// must not be published.
    pub fn run<I, S, O>(mut self, events: I, sink: &mut S, observer: &mut O) -> EngineResult<RunSummary>
    where
        I: IntoIterator<Item = EventResult<Event>>,
        S: RecordSink,
        O: ProcessObserver,
    {
        let interval = self.config.flush_interval;

        for event in events {
            let event = event?;
            let time = event.time();
            if let Some(previous) = self.last_time {
                if time < previous {
                    return Err(EngineError::TimeRegression { previous, time });
                }
            }
            self.last_time = Some(time);
            self.events += 1;

            if !self.apply(&event)? {
                self.ignored += 1;
            }
            observer.on_event(self.events, &event);

            if interval > 0 && self.events.is_multiple_of(interval) {
                self.flush(time, sink, observer)?;
            }
        }

        // ── End of log ────────────────────────────────────────────────────
        let final_time = self.final_time()?;
        let closed = {
            let ctx = ExposureContext::new(
                self.network,
                self.routes.unwrap_or(&self.no_routes),
                &self.config.modes,
                self.config.start_time,
            );
            self.agents.close_out(&ctx, final_time)?
        };
        debug!("close-out at t={final_time}: {} completed, {} aborted", closed.completed, closed.aborted);

        let mut batch = self.agents.drain_closed();
        batch.agents = self.agents.agent_records();
        self.write(final_time, batch, sink, observer)?;

        let (closed_normally, aborted) = self.agents.outcome_counts();
        let drivers = self.agents.driver_count();
        let summary = RunSummary {
            events: self.events,
            ignored: self.ignored,
            agents: self.agents.len() - drivers,
            drivers,
            vehicles: self.vehicles.len(),
            closed_normally,
            aborted,
            route_misses: self.agents.route_misses(),
            final_time,
            rows: self.rows,
        };
        info!(
            "run complete: {} events, {} agents, {} vehicles, {} legs",
            summary.events,
            summary.agents,
            summary.vehicles,
            self.agents.legs_issued()
        );
        observer.on_finish(&summary);
        Ok(summary)
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    /// Apply one event.  Returns `false` if the event was ignored.
    fn apply(&mut self, event: &Event) -> EngineResult<bool> {
        if let Some(id) = event.agent().and_then(|name| self.agents.get(name)) {
            if self.agents.is_driver(id) {
                return Ok(false);
            }
        }

        let network = self.network;
        let ctx = ExposureContext::new(
            network,
            self.routes.unwrap_or(&self.no_routes),
            &self.config.modes,
            self.config.start_time,
        );

        match event {
            Event::ActivityStart { time, agent, link, kind } => {
                let link = network.resolve(link)?;
                let id = self.agents.resolve(agent);
                self.agents.start_activity(&ctx, id, *time, link, kind)?;
            }
            Event::ActivityEnd { time, agent, link, kind } => {
                let link = network.resolve(link)?;
                let id = self.agents.resolve(agent);
                self.agents.end_activity(&ctx, id, *time, link, kind)?;
            }
            Event::Departure { time, agent, link, mode } => {
                let link = network.resolve(link)?;
                let id = self.agents.resolve(agent);
                self.agents.depart(&ctx, id, *time, link, mode)?;
            }
            Event::Arrival { time, agent, link, mode } => {
                let link = network.resolve(link)?;
                let id = self.agents.resolve(agent);
                self.agents.arrive(&ctx, id, *time, link, mode)?;
            }
            Event::Travelled { time, agent } => {
                let id = self.agents.resolve(agent);
                self.agents.teleported(id, *time)?;
            }
            Event::EntersVehicle { time, agent, vehicle, vehicle_type } => {
                let id = self.agents.resolve(agent);
                let v = self.vehicles.resolve(vehicle);
                if let Some(temp) = vehicle_type.as_deref().and_then(|t| self.config.cabin_temperature(t)) {
                    self.vehicles.set_cabin_temperature(v, temp, *time, network);
                }
                let credit = self.vehicles.add_agent(v, id, *time, network)?;
                self.agents.board(&ctx, id, *time, v, credit)?;
            }
            Event::LeavesVehicle { time, agent, vehicle } => {
                let id = self.agents.resolve(agent);
                let v = self.vehicles.resolve(vehicle);
                let (credit, link) = self.vehicles.remove_agent(v, id, *time, network)?;
                self.agents.alight(id, *time, v, link, credit)?;
            }
            Event::EnteredLink { time, vehicle, link } => {
                let link = network.resolve(link)?;
                let v = self.vehicles.resolve(vehicle);
                if let Some(residue) = self.vehicles.entered_link(v, *time, link, network)? {
                    for &occupant in residue.occupants {
                        self.agents.travel(occupant, *time, residue.link, residue.exposure)?;
                    }
                }
            }
            Event::LeftLink { time, vehicle, link } => {
                let link = network.resolve(link)?;
                let v = self.vehicles.resolve(vehicle);
                let crossing = self.vehicles.left_link(v, *time, link, network)?;
                for &occupant in crossing.occupants {
                    self.agents.travel(occupant, *time, crossing.link, crossing.exposure)?;
                }
            }
            Event::TransitDriverStarts { agent, vehicle, .. } => {
                let id = self.agents.resolve(agent);
                self.agents.mark_driver(id);
                self.vehicles.resolve(vehicle);
            }
            Event::StuckAndAbort { time, agent, mode } => {
                let id = self.agents.resolve(agent);
                if let Some(v) = self.agents.abort(&ctx, id, *time, mode.as_deref())? {
                    self.vehicles.remove_agent(v, id, *time, network)?;
                }
            }
            Event::Other { time, kind } => {
                debug!("ignoring {kind:?} event at t={time}");
                return Ok(false);
            }
        }
        Ok(true)
    }

    // ── Flushing ──────────────────────────────────────────────────────────

    fn flush<S: RecordSink, O: ProcessObserver>(&mut self, time: f64, sink: &mut S, observer: &mut O) -> EngineResult<()> {
        let batch = self.agents.drain_closed();
        self.write(time, batch, sink, observer)
    }

    fn write<S: RecordSink, O: ProcessObserver>(
        &mut self,
        time: f64,
        batch: hx_agent::ExportBatch,
        sink: &mut S,
        observer: &mut O,
    ) -> EngineResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        let counts = batch.counts();
        sink.write_batch(batch).map_err(|e| EngineError::Sink(Box::new(e)))?;
        self.rows += counts;
        observer.on_flush(time, counts);
        Ok(())
    }

    /// Close-out time: the configured `end_time`, else the last event's
    /// time, else the run start for an empty log.
    fn final_time(&self) -> EngineResult<f64> {
        match (self.config.end_time, self.last_time) {
            (Some(end), Some(last)) if end < last => {
                Err(EngineError::TimeRegression { previous: last, time: end })
            }
            (Some(end), _) => Ok(end),
            (None, Some(last)) => Ok(last),
            (None, None) => Ok(self.config.start_time),
        }
    }
}
