//! Output tables and their column layout, shared by every backend.

use hx_agent::RowCounts;

/// One canonical output table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Agents,
    Activities,
    Legs,
    Segments,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Agents, Table::Activities, Table::Legs, Table::Segments];

    /// Canonical table (or file stem) name.
    pub fn name(self) -> &'static str {
        match self {
            Table::Agents => "agents",
            Table::Activities => "activities",
            Table::Legs => "legs",
            Table::Segments => "segments",
        }
    }

    pub fn columns(self) -> &'static [&'static str] {
        match self {
            Table::Agents => &["agent_id", "itinerary_size", "total_exposure", "aborted"],
            Table::Activities => &[
                "agent_id", "idx", "kind", "link", "start_time", "end_time", "duration", "exposure", "aborted",
            ],
            Table::Legs => &[
                "leg_id", "agent_id", "idx", "mode", "start_link", "end_link", "start_time", "end_time",
                "duration", "exposure", "aborted",
            ],
            Table::Segments => &["leg_id", "idx", "link", "start_time", "end_time", "exposure"],
        }
    }

    /// This table's entry in `counts`.
    pub fn count(self, counts: &RowCounts) -> u64 {
        match self {
            Table::Agents => counts.agents,
            Table::Activities => counts.activities,
            Table::Legs => counts.legs,
            Table::Segments => counts.segments,
        }
    }

    pub(crate) fn count_mut(self, counts: &mut RowCounts) -> &mut u64 {
        match self {
            Table::Agents => &mut counts.agents,
            Table::Activities => &mut counts.activities,
            Table::Legs => &mut counts.legs,
            Table::Segments => &mut counts.segments,
        }
    }
}
