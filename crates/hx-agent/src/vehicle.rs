//! Vehicles and the exposure they accumulate for their occupants.
//!
//! # Apportioning
//!
//! A vehicle keeps one running total, `accumulated`, of the exposure inside
//! it since its last link transition.  The total is brought current
//! ("settled") at every event that touches the vehicle, and only grows while
//! someone is on board.
//!
//! Occupants are credited with whole-link totals when the vehicle leaves a
//! link.  To make each occupant's share cover exactly the time they were on
//! board, boarding hands the agent the current total as a *negative* credit
//! and alighting hands it the current total as a *positive* one:
//!
//! ```text
//!   vehicle on L:  enter ─────── t1 ───────── t2 ─────── leave
//!   agent A:                board(−acc@t1)      alight(+acc@t2)
//!   A's share of L = acc@t2 − acc@t1 = exposure over [t1, t2]
//! ```

use hx_core::{AgentId, Interner, LinkId, VehicleId};
use hx_spatial::NetworkIndex;

use crate::{AgentError, AgentResult};

// ── Vehicle ───────────────────────────────────────────────────────────────────

/// State of one vehicle.
#[derive(Clone, Debug, Default)]
pub struct Vehicle {
    /// Agents on board, in boarding order.
    pub occupants:   Vec<AgentId>,
    /// Current link, or the last one after leaving traffic.
    pub link:        Option<LinkId>,
    /// `true` between entering a link and leaving it.
    pub on_link:     bool,
    /// Time of the last settle.
    pub last_time:   f64,
    /// Time of the last link transition.
    pub link_since:  f64,
    /// Exposure since the last link transition.
    pub accumulated: f64,
    /// Fixed cabin temperature; `None` uses the ambient profile of the link.
    pub fixed_temp:  Option<f64>,
}

impl Vehicle {
    /// Exposure inside the vehicle on `link` over `[from, to]`.
    ///
    /// The cabin (or ambient) temperature is sampled once, at `to`, and held
    /// over the whole interval.
    fn interval(&self, network: &NetworkIndex, link: LinkId, from: f64, to: f64) -> f64 {
        let temp = match self.fixed_temp {
            Some(temp) => temp,
            None => network.temperature(link, to),
        };
        temp * (to - from)
    }

    /// Bring `accumulated` current to `time`.
    fn settle(&mut self, network: &NetworkIndex, time: f64) {
        if let Some(link) = self.link {
            if !self.occupants.is_empty() && time > self.last_time {
                self.accumulated += self.interval(network, link, self.last_time, time);
            }
        }
        self.last_time = time;
    }
}

/// A vehicle's share-out for one link, handed to each occupant.
pub struct Crossing<'v> {
    pub link:      LinkId,
    pub exposure:  f64,
    pub occupants: &'v [AgentId],
}

// ── VehicleRegistry ───────────────────────────────────────────────────────────

/// Lazily populated arena of vehicles, indexed by `VehicleId`.
#[derive(Default)]
pub struct VehicleRegistry {
    names:    Interner<VehicleId>,
    vehicles: Vec<Vehicle>,
}

impl VehicleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the vehicle called `name`, creating it on first sight.
    pub fn resolve(&mut self, name: &str) -> VehicleId {
        let (id, fresh) = self.names.intern(name);
        if fresh {
            self.vehicles.push(Vehicle::default());
        }
        id
    }

    pub fn get(&self, vehicle: VehicleId) -> &Vehicle {
        &self.vehicles[vehicle.index()]
    }

    pub fn name(&self, vehicle: VehicleId) -> &str {
        self.names.name(vehicle)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    fn violation(&self, vehicle: VehicleId, detail: String) -> AgentError {
        AgentError::Vehicle { vehicle: self.name(vehicle).to_owned(), detail }
    }

    /// Fix the cabin temperature from `time` on.
    pub fn set_cabin_temperature(&mut self, vehicle: VehicleId, temp: f64, time: f64, network: &NetworkIndex) {
        let v = &mut self.vehicles[vehicle.index()];
        v.settle(network, time);
        v.fixed_temp = Some(temp);
    }

    /// The vehicle moves onto `link`.
    ///
    /// If the vehicle had left traffic with people still on board, the time
    /// spent off-traffic is returned as a crossing of the previous link so
    /// it is not lost.
    pub fn entered_link(
        &mut self,
        vehicle: VehicleId,
        time: f64,
        link: LinkId,
        network: &NetworkIndex,
    ) -> AgentResult<Option<Crossing<'_>>> {
        let v = &self.vehicles[vehicle.index()];
        if v.on_link {
            let current = v.link.map_or("?", |l| network.link_name(l)).to_owned();
            return Err(self.violation(
                vehicle,
                format!("entered link {:?} while still on {current:?}", network.link_name(link)),
            ));
        }

        let v = &mut self.vehicles[vehicle.index()];
        v.settle(network, time);
        let previous = v.link.filter(|_| !v.occupants.is_empty() && time > v.link_since);
        let residue = v.accumulated;

        v.link = Some(link);
        v.on_link = true;
        v.link_since = time;
        v.accumulated = 0.0;

        let v = &self.vehicles[vehicle.index()];
        Ok(previous.map(|link| Crossing { link, exposure: residue, occupants: &v.occupants }))
    }

    /// The vehicle leaves `link`.  Returns the link's total for the
    /// occupants and resets the accumulator.
    pub fn left_link(
        &mut self,
        vehicle: VehicleId,
        time: f64,
        link: LinkId,
        network: &NetworkIndex,
    ) -> AgentResult<Crossing<'_>> {
        let v = &self.vehicles[vehicle.index()];
        if !v.on_link || v.link != Some(link) {
            let detail = match (v.on_link, v.link) {
                (true, Some(current)) => format!(
                    "left link {:?} but is on {:?}",
                    network.link_name(link),
                    network.link_name(current)
                ),
                _ => format!("left link {:?} without entering it", network.link_name(link)),
            };
            return Err(self.violation(vehicle, detail));
        }

        let v = &mut self.vehicles[vehicle.index()];
        v.settle(network, time);
        let exposure = v.accumulated;
        v.accumulated = 0.0;
        v.on_link = false;
        v.link_since = time;

        Ok(Crossing { link, exposure, occupants: &self.vehicles[vehicle.index()].occupants })
    }

    /// `agent` boards.  Returns the credit to subtract from the agent's leg.
    pub fn add_agent(
        &mut self,
        vehicle: VehicleId,
        agent: AgentId,
        time: f64,
        network: &NetworkIndex,
    ) -> AgentResult<f64> {
        if self.vehicles[vehicle.index()].occupants.contains(&agent) {
            return Err(self.violation(vehicle, format!("{agent} boarded twice")));
        }
        let v = &mut self.vehicles[vehicle.index()];
        v.settle(network, time);
        v.occupants.push(agent);
        Ok(v.accumulated)
    }

    /// `agent` alights.  Returns the credit to add to the agent's leg and
    /// the link the vehicle is on (or last was on).
    pub fn remove_agent(
        &mut self,
        vehicle: VehicleId,
        agent: AgentId,
        time: f64,
        network: &NetworkIndex,
    ) -> AgentResult<(f64, Option<LinkId>)> {
        let Some(pos) = self.vehicles[vehicle.index()].occupants.iter().position(|&a| a == agent) else {
            return Err(self.violation(vehicle, format!("{agent} left without boarding")));
        };
        let v = &mut self.vehicles[vehicle.index()];
        v.settle(network, time);
        v.occupants.remove(pos);
        Ok((v.accumulated, v.link))
    }
}
