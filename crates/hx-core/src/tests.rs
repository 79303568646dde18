//! Unit tests for hx-core primitives.

#[cfg(test)]
mod ids {
    use crate::{AgentId, Interner, LinkId, Sequence};

    #[test]
    fn index_roundtrip() {
        let id = AgentId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(AgentId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel_is_max() {
        assert_eq!(LinkId::INVALID.0, u32::MAX);
        assert_eq!(LinkId::default(), LinkId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(AgentId(7).to_string(), "AgentId(7)");
    }

    #[test]
    fn interner_assigns_dense_ids_in_first_seen_order() {
        let mut names: Interner<AgentId> = Interner::new();
        assert_eq!(names.intern("bob"), (AgentId(0), true));
        assert_eq!(names.intern("alice"), (AgentId(1), true));
        assert_eq!(names.intern("bob"), (AgentId(0), false));
        assert_eq!(names.len(), 2);
        assert_eq!(names.name(AgentId(1)), "alice");
        assert_eq!(names.get("carol"), None);
    }

    #[test]
    fn sequence_is_monotonic() {
        let mut seq = Sequence::new();
        assert_eq!(seq.next_id(), 0);
        assert_eq!(seq.next_id(), 1);
        assert_eq!(seq.issued(), 2);
    }
}

#[cfg(test)]
mod geo {
    use crate::Point;

    #[test]
    fn euclidean_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_2(b), 25.0);
    }
}

#[cfg(test)]
mod time {
    use crate::time::{bucket, bucket_start, wrap};
    use crate::Hms;

    #[test]
    fn bucket_boundaries_are_exact() {
        // S = 4 → 21 600 s buckets.
        assert_eq!(bucket(0.0, 4), 0);
        assert_eq!(bucket(21_599.0, 4), 0);
        assert_eq!(bucket(21_600.0, 4), 1);
        assert_eq!(bucket(86_400.0, 4), 4);
        // S = 24: hour boundaries, where 1/24 is not representable.
        for h in 0..48 {
            assert_eq!(bucket(h as f64 * 3_600.0, 24), h);
        }
    }

    #[test]
    fn bucket_wraps_into_day() {
        assert_eq!(wrap(4, 4), 0);
        assert_eq!(wrap(7, 4), 3);
        assert_eq!(bucket_start(5, 4), 108_000.0);
    }

    #[test]
    fn hms_display() {
        assert_eq!(Hms(0.0).to_string(), "00:00:00");
        assert_eq!(Hms(3_661.0).to_string(), "01:01:01");
        assert_eq!(Hms(91_800.0).to_string(), "25:30:00");
    }
}

#[cfg(test)]
mod modes {
    use crate::ModeRules;

    fn modes(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn interaction_by_list_and_suffix() {
        let rules = ModeRules::default();
        assert!(rules.is_interaction("fakeactivity"));
        assert!(rules.is_interaction("pt interaction"));
        assert!(rules.is_interaction("car interaction"));
        assert!(!rules.is_interaction("home"));
        assert!(!rules.is_interaction("interaction"));
    }

    #[test]
    fn main_mode_skips_placeholders() {
        let rules = ModeRules::default();
        assert_eq!(rules.main_mode(&modes(&["fakemode", "car"])), Some("car"));
        assert_eq!(rules.main_mode(&modes(&["fakemode"])), Some("fakemode"));
        assert_eq!(rules.main_mode(&[]), None);
    }

    #[test]
    fn main_mode_prefers_transit_over_access_walk() {
        let rules = ModeRules::default();
        let trip = modes(&["walk", "pt", "pt", "walk"]);
        assert_eq!(rules.main_mode(&trip), Some("pt"));
    }

    #[test]
    fn main_mode_falls_back_to_first_real_mode() {
        let rules = ModeRules::default();
        assert_eq!(rules.main_mode(&modes(&["transit_walk", "ferry", "tram"])), Some("ferry"));
    }
}

#[cfg(test)]
mod config {
    use crate::EngineConfig;

    #[test]
    fn default_is_valid() {
        EngineConfig::default().validate().unwrap();
    }

    #[test]
    fn end_before_start_rejected() {
        let config = EngineConfig { start_time: 100.0, end_time: Some(50.0), ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_finite_cabin_temperature_rejected() {
        let mut config = EngineConfig::default();
        config.cabin_temperatures.insert("car".into(), f64::NAN);
        assert!(config.validate().is_err());
        config.cabin_temperatures.insert("car".into(), 22.0);
        config.validate().unwrap();
        assert_eq!(config.cabin_temperature("car"), Some(22.0));
        assert_eq!(config.cabin_temperature("bus"), None);
    }
}
