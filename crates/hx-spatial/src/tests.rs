//! Unit tests for hx-spatial.
//!
//! All tests use hand-built networks and in-memory CSV so they run without
//! any input files.

#[cfg(test)]
mod helpers {
    use hx_core::Point;
    use crate::{NetworkIndex, NetworkIndexBuilder, TemperatureProfile};

    pub fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-6 * a.abs().max(b.abs()).max(1.0)
    }

    /// Four quarter-day samples: 10, 20, 30, 40.
    pub fn quarters() -> TemperatureProfile {
        TemperatureProfile::new("q", vec![10.0, 20.0, 30.0, 40.0]).unwrap()
    }

    /// Three collinear links along the x axis.
    ///
    /// ```text
    /// n0 ──L1(100)── n1 ──L2(300)── n2 ──L3(0)── n3
    /// ```
    ///
    /// Profile `cold` (10 °C) sits at x = 0, profile `hot` (30 °C) at
    /// x = 400, so L1 and L2 take `cold` and L3 takes `hot`.
    pub fn line() -> NetworkIndex {
        let mut b = NetworkIndexBuilder::new();
        b.add_node("n0", Point::new(0.0, 0.0)).unwrap();
        b.add_node("n1", Point::new(100.0, 0.0)).unwrap();
        b.add_node("n2", Point::new(400.0, 0.0)).unwrap();
        b.add_node("n3", Point::new(400.0, 0.0)).unwrap();
        b.add_link("L1", "n0", "n1", 100.0, 10.0).unwrap();
        b.add_link("L2", "n1", "n2", 300.0, 10.0).unwrap();
        b.add_link("L3", "n2", "n3", 0.0, 10.0).unwrap();
        b.add_profile(Point::new(0.0, 0.0), TemperatureProfile::constant("cold", 10.0).unwrap()).unwrap();
        b.add_profile(Point::new(400.0, 0.0), TemperatureProfile::constant("hot", 30.0).unwrap()).unwrap();
        b.build(None).unwrap()
    }
}

// ── TemperatureProfile ────────────────────────────────────────────────────────

#[cfg(test)]
mod profile {
    use super::helpers::{close, quarters};
    use crate::{SpatialError, TemperatureProfile};

    #[test]
    fn constant_profile_is_temperature_times_duration() {
        let p = TemperatureProfile::constant("c", 20.0).unwrap();
        assert_eq!(p.exposure(0.0, 100.0), 2_000.0);
        assert_eq!(p.exposure(500_000.0, 500_100.0), 2_000.0);
    }

    #[test]
    fn empty_interval_is_zero() {
        let p = quarters();
        assert_eq!(p.exposure(1_234.0, 1_234.0), 0.0);
    }

    #[test]
    fn temperature_lookup_by_bucket() {
        let p = quarters();
        assert_eq!(p.temperature(0.0), 10.0);
        assert_eq!(p.temperature(21_599.0), 10.0);
        assert_eq!(p.temperature(21_600.0), 20.0);
        assert_eq!(p.temperature(86_399.0), 40.0);
        // Day two wraps back to the first sample.
        assert_eq!(p.temperature(86_400.0), 10.0);
    }

    #[test]
    fn wraps_across_midnight() {
        // 10 s of the last bucket (40) + 10 s of the first bucket (10).
        let p = quarters();
        assert_eq!(p.exposure(86_390.0, 86_410.0), 10.0 * 40.0 + 10.0 * 10.0);
    }

    #[test]
    fn spans_bucket_boundaries() {
        // [20 000, 23 600]: 1 600 s at 10, 2 000 s at 20.
        let p = quarters();
        assert_eq!(p.exposure(20_000.0, 23_600.0), 1_600.0 * 10.0 + 2_000.0 * 20.0);
    }

    #[test]
    fn whole_days_use_daily_total() {
        let p = quarters();
        let day = 21_600.0 * (10.0 + 20.0 + 30.0 + 40.0);
        assert!(close(p.exposure(0.0, 86_400.0), day));
        assert!(close(p.exposure(0.0, 2.0 * 86_400.0), 2.0 * day));
        // Shifted three-day window still covers every bucket three times.
        assert!(close(p.exposure(10_800.0, 10_800.0 + 3.0 * 86_400.0), 3.0 * day));
    }

    #[test]
    fn additive_over_any_split() {
        let p = TemperatureProfile::new("h", (0..24).map(|h| 15.0 + h as f64 * 0.5).collect()).unwrap();
        let (a, b) = (3_333.0, 200_017.0);
        let whole = p.exposure(a, b);
        let mut m = a;
        while m <= b {
            assert!(close(whole, p.exposure(a, m) + p.exposure(m, b)), "split at {m}");
            m += 7_919.0;
        }
    }

    #[test]
    fn non_negative_for_non_negative_samples() {
        let p = quarters();
        let mut t = 0.0;
        while t < 3.0 * 86_400.0 {
            assert!(p.exposure(t, t + 4_321.0) >= 0.0);
            t += 5_000.0;
        }
    }

    #[test]
    fn rejects_empty_and_non_finite() {
        assert!(matches!(
            TemperatureProfile::new("e", vec![]),
            Err(SpatialError::InvalidProfile { .. })
        ));
        assert!(matches!(
            TemperatureProfile::new("n", vec![1.0, f64::INFINITY]),
            Err(SpatialError::InvalidProfile { .. })
        ));
    }
}

// ── NetworkIndex ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod network {
    use hx_core::Point;
    use crate::{NetworkIndexBuilder, SpatialError, TemperatureProfile};

    #[test]
    fn links_take_profile_nearest_to_source_node() {
        let net = super::helpers::line();
        assert_eq!(net.link_count(), 3);
        assert_eq!(net.profile_count(), 2);
        let l1 = net.resolve("L1").unwrap();
        let l2 = net.resolve("L2").unwrap();
        let l3 = net.resolve("L3").unwrap();
        assert_eq!(net.profile_of(l1).name(), "cold");
        // L2 ends next to `hot` but starts next to `cold`.
        assert_eq!(net.profile_of(l2).name(), "cold");
        assert_eq!(net.profile_of(l3).name(), "hot");
        assert_eq!(net.temperature(l3, 0.0), 30.0);
        assert_eq!(net.exposure(l1, 0.0, 10.0), 100.0);
    }

    #[test]
    fn resolve_unknown_link_is_error() {
        let net = super::helpers::line();
        assert!(net.link("nope").is_none());
        assert!(matches!(net.resolve("nope"), Err(SpatialError::UnknownLink(name)) if name == "nope"));
        assert_eq!(net.link_name(net.resolve("L2").unwrap()), "L2");
    }

    #[test]
    fn free_travel_time() {
        let net = super::helpers::line();
        assert_eq!(net.free_travel_time(net.resolve("L2").unwrap()), 30.0);
    }

    #[test]
    fn no_profiles_is_fatal() {
        let mut b = NetworkIndexBuilder::new();
        b.add_node("a", Point::new(0.0, 0.0)).unwrap();
        b.add_link("l", "a", "a", 1.0, 1.0).unwrap();
        assert!(matches!(b.build(None), Err(SpatialError::NoProfile { link }) if link == "l"));
    }

    #[test]
    fn empty_network_without_profiles_builds() {
        let net = NetworkIndexBuilder::new().build(None).unwrap();
        assert_eq!(net.link_count(), 0);
    }

    #[test]
    fn max_distance_enforced() {
        let build = |limit| {
            let mut b = NetworkIndexBuilder::new();
            b.add_node("a", Point::new(0.0, 0.0)).unwrap();
            b.add_node("b", Point::new(10.0, 0.0)).unwrap();
            b.add_link("ab", "a", "b", 10.0, 1.0).unwrap();
            b.add_profile(Point::new(30.0, 40.0), TemperatureProfile::constant("far", 1.0).unwrap())
                .unwrap();
            b.build(Some(limit))
        };
        assert!(build(50.0).is_ok());
        match build(49.0) {
            Err(SpatialError::ProfileTooFar { link, profile, distance, .. }) => {
                assert_eq!(link, "ab");
                assert_eq!(profile, "far");
                assert_eq!(distance, 50.0);
            }
            Err(e) => panic!("unexpected error {e}"),
            Ok(_) => panic!("expected ProfileTooFar"),
        }
    }

    #[test]
    fn duplicate_and_dangling_ids_rejected() {
        let mut b = NetworkIndexBuilder::new();
        b.add_node("a", Point::new(0.0, 0.0)).unwrap();
        assert!(matches!(
            b.add_node("a", Point::new(1.0, 1.0)),
            Err(SpatialError::DuplicateId { kind: "node", .. })
        ));
        assert!(matches!(b.add_link("l", "a", "zz", 1.0, 1.0), Err(SpatialError::UnknownNode(n)) if n == "zz"));
        b.add_link("l", "a", "a", 1.0, 1.0).unwrap();
        assert!(matches!(
            b.add_link("l", "a", "a", 1.0, 1.0),
            Err(SpatialError::DuplicateId { kind: "link", .. })
        ));
    }
}

// ── RouteTable ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use crate::{Route, RouteTable};

    #[test]
    fn spans_apportion_by_length() {
        let net = super::helpers::line();
        let l1 = net.resolve("L1").unwrap();
        let l2 = net.resolve("L2").unwrap();
        let route = Route { links: vec![l1, l2], distance: 400.0 };

        let spans = route.spans(&net, 1_000.0, 1_400.0).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!((spans[0].start, spans[0].end), (1_000.0, 1_100.0));
        assert_eq!((spans[1].start, spans[1].end), (1_100.0, 1_400.0));
        assert_eq!(spans[0].exposure, 1_000.0);
        assert_eq!(spans[1].exposure, 3_000.0);
    }

    #[test]
    fn last_span_ends_exactly_at_stop() {
        let net = super::helpers::line();
        let l1 = net.resolve("L1").unwrap();
        let l2 = net.resolve("L2").unwrap();
        let route = Route { links: vec![l2, l1, l2], distance: 700.0 };
        let spans = route.spans(&net, 0.0, 1.0 / 3.0).unwrap();
        assert_eq!(spans.first().unwrap().start, 0.0);
        assert_eq!(spans.last().unwrap().end, 1.0 / 3.0);
        for w in spans.windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn degenerate_routes_yield_none() {
        let net = super::helpers::line();
        let l3 = net.resolve("L3").unwrap();
        assert!(Route { links: vec![], distance: 0.0 }.spans(&net, 0.0, 10.0).is_none());
        assert!(Route { links: vec![l3], distance: 0.0 }.spans(&net, 0.0, 10.0).is_none());
    }

    #[test]
    fn first_route_for_a_key_wins() {
        let net = super::helpers::line();
        let l1 = net.resolve("L1").unwrap();
        let l2 = net.resolve("L2").unwrap();
        let mut table = RouteTable::new();
        assert!(table.insert("walk", l1, l2, Route { links: vec![l1, l2], distance: 400.0 }));
        assert!(!table.insert("walk", l1, l2, Route { links: vec![l2], distance: 300.0 }));
        assert!(table.insert("bike", l1, l2, Route { links: vec![l2], distance: 300.0 }));
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("walk", l1, l2).unwrap().distance, 400.0);
        assert!(table.get("walk", l2, l1).is_none());
        assert!(table.get("car", l1, l2).is_none());
    }
}

// ── CSV loaders ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use crate::{SpatialError, load_network_reader, load_routes_reader};

    const NODES: &str = "node_id,x,y\nn0,0,0\nn1,100,0\nn2,400,0\n";
    const LINKS: &str = "link_id,from_node,to_node,length,freespeed\nL1,n0,n1,100,10\nL2,n1,n2,300,10\n";
    const CENTROIDS: &str = "profile_id,x,y\nz1,0,0\nz2,400,0\n";

    fn load(temps: &str) -> Result<crate::NetworkIndex, SpatialError> {
        load_network_reader(NODES.as_bytes(), LINKS.as_bytes(), CENTROIDS.as_bytes(), temps.as_bytes(), None)
    }

    #[test]
    fn loads_network_with_unordered_steps() {
        let temps = "profile_id,step,temperature\nz1,1,20\nz1,0,10\nz2,0,30\n";
        let net = load(temps).unwrap();
        assert_eq!(net.link_count(), 2);
        assert_eq!(net.node_count(), 3);
        let l1 = net.resolve("L1").unwrap();
        assert_eq!(net.profile_of(l1).samples(), &[10.0, 20.0]);
        assert_eq!(net.temperature(l1, 50_000.0), 20.0);
    }

    #[test]
    fn gap_in_steps_rejected() {
        let temps = "profile_id,step,temperature\nz1,0,10\nz1,2,20\nz2,0,30\n";
        assert!(matches!(load(temps), Err(SpatialError::InvalidProfile { name, .. }) if name == "z1"));
    }

    #[test]
    fn profile_without_samples_rejected() {
        let temps = "profile_id,step,temperature\nz1,0,10\n";
        assert!(matches!(load(temps), Err(SpatialError::InvalidProfile { name, .. }) if name == "z2"));
    }

    #[test]
    fn samples_without_centroid_rejected() {
        let temps = "profile_id,step,temperature\nz1,0,10\nz2,0,30\nz9,0,1\n";
        assert!(matches!(load(temps), Err(SpatialError::UnknownProfile(name)) if name == "z9"));
    }

    #[test]
    fn malformed_row_is_parse_error() {
        let nodes = "node_id,x,y\nn0,zero,0\n";
        let result = load_network_reader(
            nodes.as_bytes(),
            "link_id,from_node,to_node,length,freespeed\n".as_bytes(),
            "profile_id,x,y\n".as_bytes(),
            "profile_id,step,temperature\n".as_bytes(),
            None,
        );
        assert!(matches!(result, Err(SpatialError::Parse(_))));
    }

    #[test]
    fn loads_routes_and_keeps_first_duplicate() {
        let net = load("profile_id,step,temperature\nz1,0,10\nz2,0,30\n").unwrap();
        let routes = "mode,start_link,end_link,distance,links\n\
                      walk,L1,L2,400,L1 L2\n\
                      walk,L1,L2,999,L2\n\
                      bike,L2,L2,300,L2\n";
        let table = load_routes_reader(routes.as_bytes(), &net).unwrap();
        assert_eq!(table.len(), 2);
        let l1 = net.resolve("L1").unwrap();
        let l2 = net.resolve("L2").unwrap();
        let walk = table.get("walk", l1, l2).unwrap();
        assert_eq!(walk.links, vec![l1, l2]);
        assert_eq!(walk.distance, 400.0);
    }

    #[test]
    fn route_through_unknown_link_rejected() {
        let net = load("profile_id,step,temperature\nz1,0,10\nz2,0,30\n").unwrap();
        let routes = "mode,start_link,end_link,distance,links\nwalk,L1,L2,400,L1 LX L2\n";
        assert!(matches!(
            load_routes_reader(routes.as_bytes(), &net),
            Err(SpatialError::UnknownLink(name)) if name == "LX"
        ));
    }
}
