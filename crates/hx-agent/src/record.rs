//! Closed itinerary elements, ready for export.
//!
//! Records carry the simulator's string ids rather than interned ids so the
//! export layer needs no access to the registries.  Optional fields are
//! `None` only on aborted elements (and `end_link` on aborted legs).

use std::ops::AddAssign;

/// One activity of an agent's itinerary.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRecord {
    pub agent_id: String,
    /// Position in the agent's itinerary (shared with legs).
    pub idx:      u32,
    pub kind:     String,
    pub link:     String,
    pub start:    f64,
    pub end:      Option<f64>,
    pub duration: Option<f64>,
    pub exposure: Option<f64>,
    pub aborted:  bool,
}

/// One logical leg (a whole trip between two real activities).
#[derive(Clone, Debug, PartialEq)]
pub struct LegRecord {
    pub leg_id:     u64,
    pub agent_id:   String,
    pub idx:        u32,
    pub mode:       String,
    pub start_link: String,
    pub end_link:   Option<String>,
    pub start:      f64,
    pub end:        Option<f64>,
    pub duration:   Option<f64>,
    pub exposure:   Option<f64>,
    pub aborted:    bool,
}

/// One link traversal within a leg.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRecord {
    pub leg_id:   u64,
    /// Position within the leg.
    pub idx:      u32,
    pub link:     String,
    pub start:    f64,
    pub end:      f64,
    pub exposure: f64,
}

/// Per-agent summary, emitted once at end of run.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentRecord {
    pub agent_id:       String,
    pub itinerary_size: u32,
    pub total_exposure: f64,
    pub aborted:        bool,
}

// ── ExportBatch ───────────────────────────────────────────────────────────────

/// Closed records drained from the registry in one flush.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExportBatch {
    pub agents:     Vec<AgentRecord>,
    pub activities: Vec<ActivityRecord>,
    pub legs:       Vec<LegRecord>,
    pub segments:   Vec<SegmentRecord>,
}

impl ExportBatch {
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty() && self.activities.is_empty() && self.legs.is_empty() && self.segments.is_empty()
    }

    pub fn counts(&self) -> RowCounts {
        RowCounts {
            agents:     self.agents.len() as u64,
            activities: self.activities.len() as u64,
            legs:       self.legs.len() as u64,
            segments:   self.segments.len() as u64,
        }
    }

    /// Move every record of `other` to the end of `self`.
    pub fn append(&mut self, other: &mut ExportBatch) {
        self.agents.append(&mut other.agents);
        self.activities.append(&mut other.activities);
        self.legs.append(&mut other.legs);
        self.segments.append(&mut other.segments);
    }
}

// ── RowCounts ─────────────────────────────────────────────────────────────────

/// Row totals per output table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub agents:     u64,
    pub activities: u64,
    pub legs:       u64,
    pub segments:   u64,
}

impl RowCounts {
    pub fn total(&self) -> u64 {
        self.agents + self.activities + self.legs + self.segments
    }
}

impl AddAssign for RowCounts {
    fn add_assign(&mut self, rhs: RowCounts) {
        self.agents += rhs.agents;
        self.activities += rhs.activities;
        self.legs += rhs.legs;
        self.segments += rhs.segments;
    }
}
