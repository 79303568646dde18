//! The per-agent itinerary state machine.
//!
//! ```text
//!            actend (first event)            depart
//!   Idle ───────────────┐        ┌──────────────────────────┐
//!     │ actstart        ▼        │                          ▼
//!     └──────► InActivity ──actend──► InVirtualLeg ◄──arrive── InLeg
//!                  ▲                   │  ▲   │                 ▲
//!                  └── actstart (real) ┘  └───┘ interaction     │
//!                                          stop    └── depart ──┘
//!
//!   abort / close-out ──► Closed   (from any state)
//! ```
//!
//! `InVirtualLeg` is the gap *between* sub-legs of one logical leg: after
//! the activity that begins the trip has ended, after each arrival, and
//! during interaction stops.  Only a real activity start closes the trip.

use std::fmt;

use hx_core::{LinkId, Sequence, VehicleId};

use crate::record::{ActivityRecord, LegRecord, SegmentRecord};
use crate::trip::{Pricing, Trip};
use crate::{AgentError, AgentResult, ExposureContext};

/// Externally visible state of an agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AgentState {
    Idle,
    InActivity,
    InLeg,
    InVirtualLeg,
    Closed,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Idle => "idle",
            AgentState::InActivity => "in an activity",
            AgentState::InLeg => "travelling",
            AgentState::InVirtualLeg => "between legs",
            AgentState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// How [`Agent::close_out`] left the agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CloseOut {
    /// Nothing was open.
    Skipped,
    /// A terminal activity was closed normally.
    Completed,
    /// The open element was truncated.
    Aborted,
}

#[derive(Clone, Debug)]
struct OpenActivity {
    idx:   u32,
    kind:  String,
    link:  LinkId,
    start: f64,
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    InActivity(OpenActivity),
    InLeg(Trip),
    InVirtualLeg(Trip),
    Closed,
}

// ── Agent ─────────────────────────────────────────────────────────────────────

/// One traveller's itinerary under construction.
#[derive(Clone, Debug)]
pub struct Agent {
    name:   String,
    phase:  Phase,
    next_idx: u32,
    total_exposure: f64,
    aborted: bool,

    // ── Closed, not yet drained ───────────────────────────────────────────
    pub(crate) activities: Vec<ActivityRecord>,
    pub(crate) legs:       Vec<LegRecord>,
    pub(crate) segments:   Vec<SegmentRecord>,
}

impl Agent {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            phase: Phase::Idle,
            next_idx: 0,
            total_exposure: 0.0,
            aborted: false,
            activities: Vec::new(),
            legs: Vec::new(),
            segments: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> AgentState {
        match self.phase {
            Phase::Idle => AgentState::Idle,
            Phase::InActivity(_) => AgentState::InActivity,
            Phase::InLeg(_) => AgentState::InLeg,
            Phase::InVirtualLeg(_) => AgentState::InVirtualLeg,
            Phase::Closed => AgentState::Closed,
        }
    }

    /// Activities and legs opened so far.
    pub fn itinerary_size(&self) -> u32 {
        self.next_idx
    }

    /// Sum of the exposure of every normally closed element.
    pub fn total_exposure(&self) -> f64 {
        self.total_exposure
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// `true` if the agent belongs in the `agents` table.
    pub fn has_outcome(&self) -> bool {
        self.next_idx > 0 || self.aborted
    }

    /// `true` if closed records are waiting to be drained.
    pub fn has_closed(&self) -> bool {
        !(self.activities.is_empty() && self.legs.is_empty() && self.segments.is_empty())
    }

    /// Vehicle the agent is currently on board, if any.
    pub fn vehicle(&self) -> Option<VehicleId> {
        match &self.phase {
            Phase::InLeg(trip) => trip.sub.as_ref().and_then(|s| s.in_vehicle),
            _ => None,
        }
    }

    fn next_idx(&mut self) -> u32 {
        let idx = self.next_idx;
        self.next_idx += 1;
        idx
    }

    fn invalid(&self, action: &'static str, time: f64) -> AgentError {
        if self.aborted {
            return AgentError::AfterAbort { agent: self.name.clone(), action };
        }
        AgentError::InvalidTransition { agent: self.name.clone(), action, state: self.state(), time }
    }

    // ── Activities ────────────────────────────────────────────────────────

    /// `actstart` of type `kind` at `link`.
    pub fn start_activity(
        &mut self,
        ctx: &ExposureContext<'_>,
        leg_ids: &mut Sequence,
        time: f64,
        link: LinkId,
        kind: &str,
    ) -> AgentResult<()> {
        let interaction = ctx.modes.is_interaction(kind);
        match &mut self.phase {
            Phase::Idle if !interaction => {
                self.open_activity(time, link, kind);
                Ok(())
            }
            Phase::InVirtualLeg(trip) if interaction && trip.stop.is_none() => {
                trip.settle_waiting(ctx, time, Some(link));
                trip.stop = Some(kind.to_owned());
                Ok(())
            }
            Phase::InVirtualLeg(trip) if !interaction && trip.stop.is_none() && !trip.modes.is_empty() => {
                trip.settle_waiting(ctx, time, None);
                let Phase::InVirtualLeg(trip) = std::mem::replace(&mut self.phase, Phase::Closed) else {
                    unreachable!("phase checked above")
                };
                self.finish_leg(ctx, leg_ids, trip, time, link);
                self.open_activity(time, link, kind);
                Ok(())
            }
            _ => Err(self.invalid("start an activity", time)),
        }
    }

    fn open_activity(&mut self, time: f64, link: LinkId, kind: &str) {
        let idx = self.next_idx();
        self.phase = Phase::InActivity(OpenActivity { idx, kind: kind.to_owned(), link, start: time });
    }

    /// `actend` of type `kind` at `link`.
    pub fn end_activity(
        &mut self,
        ctx: &ExposureContext<'_>,
        time: f64,
        link: LinkId,
        kind: &str,
    ) -> AgentResult<()> {
        match &mut self.phase {
            Phase::InActivity(act) => {
                if act.kind != kind {
                    return Err(AgentError::ActivityMismatch {
                        agent:    self.name.clone(),
                        expected: act.kind.clone(),
                        found:    kind.to_owned(),
                    });
                }
                let act = act.clone();
                self.close_activity(ctx, act, time);
            }
            Phase::Idle if !ctx.modes.is_interaction(kind) => {
                // The log opens mid-activity: it began at the run start.
                let idx = self.next_idx();
                let act = OpenActivity { idx, kind: kind.to_owned(), link, start: ctx.start_time.min(time) };
                self.close_activity(ctx, act, time);
            }
            Phase::InVirtualLeg(trip) if trip.stop.is_some() => {
                if trip.stop.as_deref() != Some(kind) {
                    return Err(AgentError::ActivityMismatch {
                        agent:    self.name.clone(),
                        expected: trip.stop.clone().unwrap_or_default(),
                        found:    kind.to_owned(),
                    });
                }
                trip.settle_waiting(ctx, time, Some(link));
                trip.stop = None;
                return Ok(());
            }
            _ => return Err(self.invalid("end an activity", time)),
        }

        let idx = self.next_idx();
        self.phase = Phase::InVirtualLeg(Trip::departing(idx, time, link));
        Ok(())
    }

    fn close_activity(&mut self, ctx: &ExposureContext<'_>, act: OpenActivity, time: f64) {
        let exposure = ctx.network.exposure(act.link, act.start, time);
        self.total_exposure += exposure;
        self.activities.push(ActivityRecord {
            agent_id: self.name.clone(),
            idx:      act.idx,
            kind:     act.kind,
            link:     ctx.network.link_name(act.link).to_owned(),
            start:    act.start,
            end:      Some(time),
            duration: Some(time - act.start),
            exposure: Some(exposure),
            aborted:  false,
        });
    }

    // ── Legs ──────────────────────────────────────────────────────────────

    /// `departure` by `mode` from `link`.
    pub fn depart(&mut self, ctx: &ExposureContext<'_>, time: f64, link: LinkId, mode: &str) -> AgentResult<()> {
        let mut trip = match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::InVirtualLeg(trip) if trip.stop.is_none() => trip,
            // The log opens with this agent already on its way.
            Phase::Idle => {
                let idx = self.next_idx();
                Trip::departing(idx, time, link)
            }
            other => {
                self.phase = other;
                return Err(self.invalid("depart", time));
            }
        };
        trip.depart(ctx, time, link, mode);
        self.phase = Phase::InLeg(trip);
        Ok(())
    }

    fn open_leg(&mut self, action: &'static str, time: f64) -> AgentResult<&mut Trip> {
        // Checked before borrowing: returning the borrow from an `if let` and
        // then calling `self.invalid` is rejected by the borrow checker.
        if !matches!(self.phase, Phase::InLeg(_)) {
            return Err(self.invalid(action, time));
        }
        match &mut self.phase {
            Phase::InLeg(trip) => Ok(trip),
            _ => unreachable!("phase checked above"),
        }
    }

    /// `travelled` marker of a teleported leg.  Carries no exposure.
    pub fn teleported(&mut self, time: f64) -> AgentResult<()> {
        self.open_leg("finish a teleport", time).map(|_| ())
    }

    /// Board `vehicle`.  `credit` is the vehicle's running total.
    pub fn board(&mut self, ctx: &ExposureContext<'_>, time: f64, vehicle: VehicleId, credit: f64) -> AgentResult<()> {
        let trip = self.open_leg("board a vehicle", time)?;
        if trip.sub.as_ref().is_some_and(|s| s.in_vehicle.is_some()) {
            return Err(self.invalid("board a second vehicle", time));
        }
        trip.board(ctx, time, vehicle, credit);
        Ok(())
    }

    /// The agent's vehicle finished `link`.
    pub fn travel(&mut self, time: f64, link: LinkId, credit: f64) -> AgentResult<()> {
        let trip = self.open_leg("travel", time)?;
        if trip.sub.as_ref().is_none_or(|s| s.in_vehicle.is_none()) {
            return Err(self.invalid("travel outside a vehicle", time));
        }
        trip.credit(time, link, credit);
        Ok(())
    }

    /// Leave `vehicle`, which is on `link` (if known).
    pub fn alight(&mut self, time: f64, vehicle: VehicleId, link: Option<LinkId>, credit: f64) -> AgentResult<()> {
        let trip = self.open_leg("leave a vehicle", time)?;
        if trip.sub.as_ref().and_then(|s| s.in_vehicle) != Some(vehicle) {
            return Err(self.invalid("leave a vehicle it is not in", time));
        }
        trip.alight(time, link, credit);
        Ok(())
    }

    /// `arrival` by `mode` at `link`.
    pub fn arrive(&mut self, ctx: &ExposureContext<'_>, time: f64, link: LinkId, mode: &str) -> AgentResult<Pricing> {
        let (expected, aboard) = match &self.phase {
            Phase::InLeg(Trip { sub: Some(sub), .. }) => (sub.mode.as_str(), sub.in_vehicle.is_some()),
            _ => return Err(self.invalid("arrive", time)),
        };
        if expected != mode {
            return Err(AgentError::ModeMismatch {
                agent:    self.name.clone(),
                expected: expected.to_owned(),
                found:    mode.to_owned(),
            });
        }
        if aboard {
            return Err(self.invalid("arrive while on board", time));
        }
        let Phase::InLeg(mut trip) = std::mem::replace(&mut self.phase, Phase::Closed) else {
            unreachable!("phase checked above")
        };
        let pricing = trip.arrive(ctx, time, link);
        self.phase = Phase::InVirtualLeg(trip);
        Ok(pricing)
    }

    fn finish_leg(&mut self, ctx: &ExposureContext<'_>, leg_ids: &mut Sequence, trip: Trip, end: f64, end_link: LinkId) {
        let leg_id = leg_ids.next_id();
        let mode = ctx.modes.main_mode(&trip.modes).unwrap_or_default().to_owned();
        self.total_exposure += trip.exposure;
        self.push_segments(ctx, leg_id, &trip);
        self.legs.push(LegRecord {
            leg_id,
            agent_id:   self.name.clone(),
            idx:        trip.idx,
            mode,
            start_link: ctx.network.link_name(trip.start_link).to_owned(),
            end_link:   Some(ctx.network.link_name(end_link).to_owned()),
            start:      trip.start,
            end:        Some(end),
            duration:   Some(end - trip.start),
            exposure:   Some(trip.exposure),
            aborted:    false,
        });
    }

    fn push_segments(&mut self, ctx: &ExposureContext<'_>, leg_id: u64, trip: &Trip) {
        self.segments.extend(trip.segments.iter().enumerate().map(|(i, s)| SegmentRecord {
            leg_id,
            idx: i as u32,
            link: ctx.network.link_name(s.link).to_owned(),
            start: s.start,
            end: s.end,
            exposure: s.exposure,
        }));
    }

    // ── Termination ───────────────────────────────────────────────────────

    /// `stuckAndAbort`: truncate whatever is open.
    ///
    /// The truncated element keeps its own start; `time` is not stored, since
    /// an aborted element has no end.  An agent with nothing open is still
    /// marked aborted so it gets an (empty) agent row.
    ///
    /// Returns the vehicle the agent was on board, so the caller can take it
    /// off the occupant list.
    pub fn abort(
        &mut self,
        ctx: &ExposureContext<'_>,
        leg_ids: &mut Sequence,
        time: f64,
        mode: Option<&str>,
    ) -> AgentResult<Option<VehicleId>> {
        let vehicle = self.vehicle();
        match std::mem::replace(&mut self.phase, Phase::Closed) {
            Phase::Idle => {}
            Phase::InActivity(act) => {
                self.activities.push(ActivityRecord {
                    agent_id: self.name.clone(),
                    idx:      act.idx,
                    kind:     act.kind,
                    link:     ctx.network.link_name(act.link).to_owned(),
                    start:    act.start,
                    end:      None,
                    duration: None,
                    exposure: None,
                    aborted:  true,
                });
            }
            Phase::InLeg(trip) | Phase::InVirtualLeg(trip) => {
                let leg_id = leg_ids.next_id();
                let modes = trip.modes_with_open();
                let mode = ctx.modes.main_mode(&modes).or(mode).unwrap_or_default().to_owned();
                self.push_segments(ctx, leg_id, &trip);
                self.legs.push(LegRecord {
                    leg_id,
                    agent_id:   self.name.clone(),
                    idx:        trip.idx,
                    mode,
                    start_link: ctx.network.link_name(trip.start_link).to_owned(),
                    end_link:   None,
                    start:      trip.start,
                    end:        None,
                    duration:   None,
                    exposure:   None,
                    aborted:    true,
                });
            }
            Phase::Closed => {
                return Err(if self.aborted {
                    AgentError::AfterAbort { agent: self.name.clone(), action: "abort" }
                } else {
                    AgentError::InvalidTransition {
                        agent:  self.name.clone(),
                        action: "abort",
                        state:  AgentState::Closed,
                        time,
                    }
                });
            }
        }
        self.aborted = true;
        Ok(vehicle)
    }

    /// End-of-log close-out at `final_time`.
    ///
    /// An agent resting in a terminal activity (e.g. `home`) completes it;
    /// anything else still open is aborted.
    pub fn close_out(&mut self, ctx: &ExposureContext<'_>, leg_ids: &mut Sequence, final_time: f64) -> AgentResult<CloseOut> {
        match &self.phase {
            Phase::Idle | Phase::Closed => Ok(CloseOut::Skipped),
            Phase::InActivity(act) if ctx.modes.is_terminal(&act.kind) => {
                let act = act.clone();
                let end = final_time.max(act.start);
                self.close_activity(ctx, act, end);
                self.phase = Phase::Closed;
                Ok(CloseOut::Completed)
            }
            _ => {
                self.abort(ctx, leg_ids, final_time, None)?;
                Ok(CloseOut::Aborted)
            }
        }
    }
}
