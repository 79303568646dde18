//! Lazily populated arena of agents.
//!
//! Agents are interned on first reference and stored in a `Vec` indexed by
//! `AgentId`.  Every operation forwards to the agent's state machine and
//! then marks the agent *dirty* if it now holds closed records, so a flush
//! only visits agents that have something to export.

use log::{debug, warn};

use hx_core::{AgentId, Interner, LinkId, Sequence, VehicleId};

use crate::agent::{Agent, CloseOut};
use crate::record::{AgentRecord, ExportBatch};
use crate::trip::Pricing;
use crate::{AgentResult, ExposureContext};

/// Outcome counts of [`AgentRegistry::close_out`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CloseOutSummary {
    pub completed: u64,
    pub aborted:   u64,
}

/// All agents of a run.
#[derive(Default)]
pub struct AgentRegistry {
    names:   Interner<AgentId>,
    agents:  Vec<Agent>,
    /// Transit drivers; their events carry no passenger itinerary.
    drivers: Vec<bool>,
    dirty:   Vec<AgentId>,
    queued:  Vec<bool>,
    leg_ids: Sequence,
    route_misses: u64,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the agent called `name`, creating it on first sight.
    pub fn resolve(&mut self, name: &str) -> AgentId {
        let (id, fresh) = self.names.intern(name);
        if fresh {
            self.agents.push(Agent::new(name));
            self.drivers.push(false);
            self.queued.push(false);
        }
        id
    }

    /// Existing agent by name, without creating it.
    pub fn get(&self, name: &str) -> Option<AgentId> {
        self.names.get(name)
    }

    pub fn agent(&self, id: AgentId) -> &Agent {
        &self.agents[id.index()]
    }

    pub fn name(&self, id: AgentId) -> &str {
        self.names.name(id)
    }

    /// Number of agents seen, drivers included.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Number of agents marked as transit drivers.
    pub fn driver_count(&self) -> usize {
        self.drivers.iter().filter(|&&d| d).count()
    }

    pub fn mark_driver(&mut self, id: AgentId) {
        self.drivers[id.index()] = true;
    }

    #[inline]
    pub fn is_driver(&self, id: AgentId) -> bool {
        self.drivers[id.index()]
    }

    /// Sub-legs priced by the whole-leg fallback instead of a route.
    pub fn route_misses(&self) -> u64 {
        self.route_misses
    }

    /// Leg ids handed out so far.
    pub fn legs_issued(&self) -> u64 {
        self.leg_ids.issued()
    }

    fn touch(&mut self, id: AgentId) {
        let i = id.index();
        if !self.queued[i] && self.agents[i].has_closed() {
            self.queued[i] = true;
            self.dirty.push(id);
        }
    }

    // ── Itinerary events ──────────────────────────────────────────────────

    pub fn start_activity(
        &mut self,
        ctx: &ExposureContext<'_>,
        id: AgentId,
        time: f64,
        link: LinkId,
        kind: &str,
    ) -> AgentResult<()> {
        self.agents[id.index()].start_activity(ctx, &mut self.leg_ids, time, link, kind)?;
        self.touch(id);
        Ok(())
    }

    pub fn end_activity(
        &mut self,
        ctx: &ExposureContext<'_>,
        id: AgentId,
        time: f64,
        link: LinkId,
        kind: &str,
    ) -> AgentResult<()> {
        self.agents[id.index()].end_activity(ctx, time, link, kind)?;
        self.touch(id);
        Ok(())
    }

    pub fn depart(&mut self, ctx: &ExposureContext<'_>, id: AgentId, time: f64, link: LinkId, mode: &str) -> AgentResult<()> {
        self.agents[id.index()].depart(ctx, time, link, mode)
    }

    pub fn arrive(&mut self, ctx: &ExposureContext<'_>, id: AgentId, time: f64, link: LinkId, mode: &str) -> AgentResult<()> {
        if self.agents[id.index()].arrive(ctx, time, link, mode)? == Pricing::Fallback {
            self.route_misses += 1;
            debug!(
                "agent {:?}: no {mode} route to {} at t={time}, using whole-leg ambient lookup",
                self.names.name(id),
                ctx.network.link_name(link)
            );
        }
        Ok(())
    }

    pub fn teleported(&mut self, id: AgentId, time: f64) -> AgentResult<()> {
        self.agents[id.index()].teleported(time)
    }

    // ── Vehicle credits ───────────────────────────────────────────────────

    pub fn board(
        &mut self,
        ctx: &ExposureContext<'_>,
        id: AgentId,
        time: f64,
        vehicle: VehicleId,
        credit: f64,
    ) -> AgentResult<()> {
        self.agents[id.index()].board(ctx, time, vehicle, credit)
    }

    /// Credit a link crossing.  Ignored for agents already closed.
    pub fn travel(&mut self, id: AgentId, time: f64, link: LinkId, credit: f64) -> AgentResult<()> {
        let agent = &mut self.agents[id.index()];
        if agent.is_aborted() {
            return Ok(());
        }
        agent.travel(time, link, credit)
    }

    pub fn alight(
        &mut self,
        id: AgentId,
        time: f64,
        vehicle: VehicleId,
        link: Option<LinkId>,
        credit: f64,
    ) -> AgentResult<()> {
        self.agents[id.index()].alight(time, vehicle, link, credit)
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// Abort an agent.  Returns the vehicle it was on, if any.
    pub fn abort(
        &mut self,
        ctx: &ExposureContext<'_>,
        id: AgentId,
        time: f64,
        mode: Option<&str>,
    ) -> AgentResult<Option<VehicleId>> {
        let vehicle = self.agents[id.index()].abort(ctx, &mut self.leg_ids, time, mode)?;
        self.touch(id);
        Ok(vehicle)
    }

    /// Close every open itinerary at `final_time`.  Transit drivers are
    /// skipped.
    pub fn close_out(&mut self, ctx: &ExposureContext<'_>, final_time: f64) -> AgentResult<CloseOutSummary> {
        let mut summary = CloseOutSummary::default();
        for i in 0..self.agents.len() {
            if self.drivers[i] {
                continue;
            }
            let id = AgentId(i as u32);
            match self.agents[i].close_out(ctx, &mut self.leg_ids, final_time)? {
                CloseOut::Skipped => {}
                CloseOut::Completed => summary.completed += 1,
                CloseOut::Aborted => summary.aborted += 1,
            }
            self.touch(id);
        }
        if summary.aborted > 0 {
            warn!("{} agents still travelling at end of log were aborted", summary.aborted);
        }
        Ok(summary)
    }

    // ── Export ────────────────────────────────────────────────────────────

    /// Move every closed activity, leg, and segment out of the registry.
    pub fn drain_closed(&mut self) -> ExportBatch {
        let mut batch = ExportBatch::default();
        for id in self.dirty.drain(..) {
            let agent = &mut self.agents[id.index()];
            batch.activities.append(&mut agent.activities);
            batch.legs.append(&mut agent.legs);
            batch.segments.append(&mut agent.segments);
            self.queued[id.index()] = false;
        }
        batch
    }

    /// One summary row per agent with at least one itinerary element, plus
    /// aborted agents that never got one.
    pub fn agent_records(&self) -> Vec<AgentRecord> {
        self.agents
            .iter()
            .zip(&self.drivers)
            .filter(|(agent, driver)| !**driver && agent.has_outcome())
            .map(|(agent, _)| AgentRecord {
                agent_id:       agent.name().to_owned(),
                itinerary_size: agent.itinerary_size(),
                total_exposure: agent.total_exposure(),
                aborted:        agent.is_aborted(),
            })
            .collect()
    }

    /// Agents that closed normally and agents that were aborted.
    pub fn outcome_counts(&self) -> (u64, u64) {
        let mut closed = 0;
        let mut aborted = 0;
        for (agent, &driver) in self.agents.iter().zip(&self.drivers) {
            if driver || !agent.has_outcome() {
                continue;
            }
            if agent.is_aborted() { aborted += 1 } else { closed += 1 }
        }
        (closed, aborted)
    }
}
