//! Precomputed routes for legs the simulator does not move link by link.
//!
//! Teleported and walk legs appear in the event log only as a departure and
//! an arrival.  The route table supplies the link sequence such a leg took,
//! keyed by `(mode, start_link, end_link)`, so that the leg's duration can
//! be apportioned across its links and each link integrated against its own
//! temperature profile.

use std::collections::HashMap;

use hx_core::LinkId;

use crate::NetworkIndex;

/// An ordered list of links for one `(mode, start, end)` combination.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub links:    Vec<LinkId>,
    /// Total distance as reported by the route producer, in metres.
    pub distance: f64,
}

/// One link's share of an apportioned leg.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinkSpan {
    pub link:     LinkId,
    pub start:    f64,
    pub end:      f64,
    pub exposure: f64,
}

impl Route {
    /// Split `[start, stop]` across the route's links in proportion to their
    /// lengths, integrating each sub-interval on its own link.
    ///
    /// The first span starts exactly at `start` and the last ends exactly at
    /// `stop`.  Returns `None` if the route has no links or a total length of
    /// zero, in which case the caller falls back to a whole-leg lookup.
    pub fn spans(&self, network: &NetworkIndex, start: f64, stop: f64) -> Option<Vec<LinkSpan>> {
        let total: f64 = self.links.iter().map(|&l| network.link_length(l)).sum();
        if self.links.is_empty() || total <= 0.0 {
            return None;
        }
        let duration = stop - start;
        let last = self.links.len() - 1;

        let mut spans = Vec::with_capacity(self.links.len());
        let mut covered = 0.0;
        let mut from = start;
        for (i, &link) in self.links.iter().enumerate() {
            covered += network.link_length(link);
            let to = if i == last { stop } else { start + duration * (covered / total) };
            spans.push(LinkSpan { link, start: from, end: to, exposure: network.exposure(link, from, to) });
            from = to;
        }
        Some(spans)
    }
}

/// Route lookup keyed by leg mode, then by `(start_link, end_link)`.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    by_mode: HashMap<String, HashMap<(LinkId, LinkId), Route>>,
    len:     usize,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a route.  The first route for a key wins; returns `false` if
    /// the key was already present and `route` was dropped.
    pub fn insert(&mut self, mode: &str, start: LinkId, end: LinkId, route: Route) -> bool {
        let by_od = self.by_mode.entry(mode.to_owned()).or_default();
        if by_od.contains_key(&(start, end)) {
            return false;
        }
        by_od.insert((start, end), route);
        self.len += 1;
        true
    }

    #[inline]
    pub fn get(&self, mode: &str, start: LinkId, end: LinkId) -> Option<&Route> {
        self.by_mode.get(mode)?.get(&(start, end))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
