//! Leg-mode and activity-type classification rules.
//!
//! Modes and activity types are simulator-defined strings, so they stay
//! strings here.  `ModeRules` decides three things the state machine needs:
//!
//! - which leg modes are *virtual* placeholders (the synthetic legs a
//!   simulator emits around a teleported leg),
//! - which activity types are pass-through *interactions* that bridge
//!   sub-legs of one trip rather than real dwell activities,
//! - which activity types are *terminal*, i.e. may legitimately still be
//!   open when the log ends.

/// Classification rules for leg modes and activity types.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ModeRules {
    /// Placeholder modes never reported as a logical leg's mode unless the
    /// trip has nothing else.
    pub virtual_modes: Vec<String>,

    /// Preferred main modes, highest priority first.  A multi-sub-leg trip is
    /// labelled with the first entry present among its non-virtual modes.
    pub main_mode_priority: Vec<String>,

    /// Activity types that are always interactions.
    pub interaction_types: Vec<String>,

    /// Any activity type ending in this suffix is an interaction
    /// (`"car interaction"`, `"pt interaction"`, …).
    pub interaction_suffix: Option<String>,

    /// Activity types closed normally at end of run instead of aborted.
    pub terminal_activity_types: Vec<String>,
}

impl Default for ModeRules {
    fn default() -> Self {
        Self {
            virtual_modes: to_strings(&[
                "fakemode",
                "non_network_walk",
                "access_walk",
                "egress_walk",
                "transit_walk",
            ]),
            main_mode_priority: to_strings(&["pt", "car", "ride", "bike", "walk"]),
            interaction_types:  to_strings(&["fakeactivity"]),
            interaction_suffix: Some(" interaction".to_owned()),
            terminal_activity_types: to_strings(&["home"]),
        }
    }
}

impl ModeRules {
    #[inline]
    pub fn is_virtual(&self, mode: &str) -> bool {
        self.virtual_modes.iter().any(|m| m == mode)
    }

    /// `true` if an activity of this type only bridges two sub-legs.
    pub fn is_interaction(&self, kind: &str) -> bool {
        self.interaction_types.iter().any(|t| t == kind)
            || self
                .interaction_suffix
                .as_deref()
                .is_some_and(|suffix| !suffix.is_empty() && kind.ends_with(suffix))
    }

    #[inline]
    pub fn is_terminal(&self, kind: &str) -> bool {
        self.terminal_activity_types.iter().any(|t| t == kind)
    }

    /// The mode that labels a trip made of `modes` (in travel order).
    ///
    /// 1. the highest-priority non-virtual mode present;
    /// 2. otherwise the first non-virtual mode;
    /// 3. otherwise the last mode (a trip of placeholders only).
    ///
    /// Returns `None` only for an empty slice.
    pub fn main_mode<'m>(&self, modes: &'m [String]) -> Option<&'m str> {
        for preferred in &self.main_mode_priority {
            if let Some(m) = modes.iter().find(|m| *m == preferred && !self.is_virtual(m)) {
                return Some(m.as_str());
            }
        }
        modes
            .iter()
            .find(|m| !self.is_virtual(m))
            .or_else(|| modes.last())
            .map(String::as_str)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_owned()).collect()
}
