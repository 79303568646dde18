//! The logical-leg accumulator.
//!
//! A simulator may split one trip between two real activities into several
//! sub-legs: a placeholder leg around a teleport, or walk/pt/pt/walk joined
//! by interaction stops.  A `Trip` collects every sub-leg, the gaps between
//! them, and their segments until the next real activity starts, and is
//! then closed as a single leg.

use hx_core::{LinkId, VehicleId};
use hx_spatial::LinkSpan;

use crate::ExposureContext;

/// How an arriving sub-leg was priced.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pricing {
    /// From vehicle credits (plus time spent outside the vehicle).
    Vehicle,
    /// Apportioned across a route table entry.
    Routed,
    /// No usable route: one ambient lookup at the departure link.
    Fallback,
    /// Zero-duration sub-leg (e.g. a teleport placeholder); nothing to price.
    Instant,
}

/// One simulated sub-leg, departure to arrival.
#[derive(Clone, Debug)]
pub(crate) struct SubLeg {
    pub mode:       String,
    pub start:      f64,
    pub link:       LinkId,
    /// Vehicle currently on board, if any.
    pub in_vehicle: Option<VehicleId>,
    /// Set once the agent has boarded any vehicle during this sub-leg.
    pub boarded:    bool,
    /// Open out-of-vehicle interval: `(since, link)`.
    pub outside:    Option<(f64, LinkId)>,
    /// Start of the agent's current in-vehicle segment.
    pub segment_start:  f64,
    /// Boarding credit not yet folded into a segment.
    pub segment_offset: f64,
}

#[derive(Clone, Debug)]
pub(crate) struct Trip {
    /// Itinerary position of the resulting leg.
    pub idx:        u32,
    pub start:      f64,
    pub start_link: LinkId,
    /// Modes of completed sub-legs, in travel order.
    pub modes:      Vec<String>,
    pub exposure:   f64,
    pub segments:   Vec<LinkSpan>,
    /// The sub-leg in progress (`InLeg`).
    pub sub:        Option<SubLeg>,
    /// Open ambient interval between sub-legs: `(since, link)`.
    pub waiting:    Option<(f64, LinkId)>,
    /// Activity type of an open interaction stop.
    pub stop:       Option<String>,
}

impl Trip {
    /// A trip whose traveller is standing at `link` from `time`.
    pub fn departing(idx: u32, time: f64, link: LinkId) -> Self {
        Self {
            idx,
            start: time,
            start_link: link,
            modes: Vec::new(),
            exposure: 0.0,
            segments: Vec::new(),
            sub: None,
            waiting: Some((time, link)),
            stop: None,
        }
    }

    /// Integrate the open waiting interval up to `time` and restart it at
    /// `link`.
    pub fn settle_waiting(&mut self, ctx: &ExposureContext<'_>, time: f64, link: Option<LinkId>) {
        if let Some((since, at)) = self.waiting.take() {
            if time > since {
                self.exposure += ctx.network.exposure(at, since, time);
            }
        }
        self.waiting = link.map(|l| (time, l));
    }

    /// Open a sub-leg.  Ends any waiting interval.
    pub fn depart(&mut self, ctx: &ExposureContext<'_>, time: f64, link: LinkId, mode: &str) {
        self.settle_waiting(ctx, time, None);
        self.sub = Some(SubLeg {
            mode: mode.to_owned(),
            start: time,
            link,
            in_vehicle: None,
            boarded: false,
            outside: Some((time, link)),
            segment_start: time,
            segment_offset: 0.0,
        });
    }

    /// Board `vehicle`.  `credit` is the vehicle's running total at `time`.
    pub fn board(&mut self, ctx: &ExposureContext<'_>, time: f64, vehicle: VehicleId, credit: f64) {
        let Some(sub) = self.sub.as_mut() else { return };
        if let Some((since, at)) = sub.outside.take() {
            if time > since {
                self.exposure += ctx.network.exposure(at, since, time);
            }
        }
        self.exposure -= credit;
        sub.segment_offset = -credit;
        sub.segment_start = time;
        sub.in_vehicle = Some(vehicle);
        sub.boarded = true;
    }

    /// The vehicle finished a link (or the agent alighted on it).
    ///
    /// A zero-length stretch adds its (zero) net credit but no segment.
    pub fn credit(&mut self, time: f64, link: LinkId, credit: f64) {
        let Some(sub) = self.sub.as_mut() else { return };
        self.exposure += credit;
        if time > sub.segment_start {
            self.segments.push(LinkSpan {
                link,
                start: sub.segment_start,
                end: time,
                exposure: credit + sub.segment_offset,
            });
        }
        sub.segment_offset = 0.0;
        sub.segment_start = time;
    }

    /// Leave the vehicle at `time`; the agent then waits outside at `link`.
    pub fn alight(&mut self, time: f64, link: Option<LinkId>, credit: f64) {
        match link {
            Some(l) => self.credit(time, l, credit),
            None => self.exposure += credit,
        }
        if let Some(sub) = self.sub.as_mut() {
            let at = link.unwrap_or(sub.link);
            sub.in_vehicle = None;
            sub.outside = Some((time, at));
        }
    }

    /// Close the open sub-leg at `time`, `link` and start waiting there.
    pub fn arrive(&mut self, ctx: &ExposureContext<'_>, time: f64, link: LinkId) -> Pricing {
        let Some(sub) = self.sub.take() else { return Pricing::Fallback };

        let pricing = if !sub.boarded && time <= sub.start {
            Pricing::Instant
        } else if sub.boarded {
            if let Some((since, at)) = sub.outside {
                if time > since {
                    self.exposure += ctx.network.exposure(at, since, time);
                }
            }
            Pricing::Vehicle
        } else {
            let spans = ctx
                .routes
                .get(&sub.mode, sub.link, link)
                .and_then(|route| route.spans(ctx.network, sub.start, time));
            match spans {
                Some(spans) => {
                    self.exposure += spans.iter().map(|s| s.exposure).sum::<f64>();
                    self.segments.extend(spans);
                    Pricing::Routed
                }
                None => {
                    let exposure = ctx.network.exposure(sub.link, sub.start, time);
                    self.exposure += exposure;
                    self.segments.push(LinkSpan { link: sub.link, start: sub.start, end: time, exposure });
                    Pricing::Fallback
                }
            }
        };

        self.modes.push(sub.mode);
        self.waiting = Some((time, link));
        pricing
    }

    /// All modes used so far, including the open sub-leg's.
    pub fn modes_with_open(&self) -> Vec<String> {
        let mut modes = self.modes.clone();
        if let Some(sub) = &self.sub {
            modes.push(sub.mode.clone());
        }
        modes
    }
}
