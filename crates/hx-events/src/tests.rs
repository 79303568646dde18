//! Unit tests for hx-events.

#[cfg(test)]
mod helpers {
    use crate::{Event, EventReader, EventResult};

    pub const HEADER: &str = "time,type,person,vehicle,link,actType,legMode,vehicleType\n";

    pub fn read(body: &str) -> Vec<EventResult<Event>> {
        let text = format!("{HEADER}{body}");
        EventReader::new(text.as_bytes()).collect()
    }

    pub fn read_ok(body: &str) -> Vec<Event> {
        read(body).into_iter().map(|e| e.unwrap()).collect()
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod decode {
    use super::helpers::read_ok;
    use crate::Event;

    #[test]
    fn activity_and_leg_events() {
        let events = read_ok(
            "0,actend,p1,,L1,home,,\n\
             0,departure,p1,,L1,,car,\n\
             100,arrival,p1,,L2,,car,\n\
             100,actstart,p1,,L2,work,,\n",
        );
        assert_eq!(
            events,
            vec![
                Event::ActivityEnd { time: 0.0, agent: "p1".into(), link: "L1".into(), kind: "home".into() },
                Event::Departure { time: 0.0, agent: "p1".into(), link: "L1".into(), mode: "car".into() },
                Event::Arrival { time: 100.0, agent: "p1".into(), link: "L2".into(), mode: "car".into() },
                Event::ActivityStart { time: 100.0, agent: "p1".into(), link: "L2".into(), kind: "work".into() },
            ]
        );
    }

    #[test]
    fn vehicle_events_and_traffic_aliases() {
        let events = read_ok(
            "5,PersonEntersVehicle,p1,v1,,,,bus\n\
             5,vehicle enters traffic,,v1,L1,,,\n\
             9,left link,,v1,L1,,,\n\
             9,entered link,,v1,L2,,,\n\
             12,vehicle leaves traffic,,v1,L2,,,\n\
             12,PersonLeavesVehicle,p1,v1,,,,\n",
        );
        assert_eq!(
            events[0],
            Event::EntersVehicle {
                time: 5.0,
                agent: "p1".into(),
                vehicle: "v1".into(),
                vehicle_type: Some("bus".into()),
            }
        );
        assert!(matches!(&events[1], Event::EnteredLink { link, .. } if link == "L1"));
        assert!(matches!(&events[2], Event::LeftLink { link, .. } if link == "L1"));
        assert!(matches!(&events[3], Event::EnteredLink { link, .. } if link == "L2"));
        assert!(matches!(&events[4], Event::LeftLink { link, .. } if link == "L2"));
        assert!(matches!(&events[5], Event::LeavesVehicle { vehicle, .. } if vehicle == "v1"));
    }

    #[test]
    fn optional_fields_become_none() {
        let events = read_ok(
            "1,PersonEntersVehicle,p1,v1,,,,\n\
             2,stuckAndAbort,p1,,,,,\n\
             3,stuckAndAbort,p2,,L4,,walk,\n",
        );
        assert!(matches!(&events[0], Event::EntersVehicle { vehicle_type: None, .. }));
        assert!(matches!(&events[1], Event::StuckAndAbort { mode: None, .. }));
        assert!(matches!(&events[2], Event::StuckAndAbort { mode: Some(m), .. } if m == "walk"));
    }

    #[test]
    fn unknown_types_are_other() {
        let events = read_ok("7,personMoney,p1,,,,,\n8,travelled,p1,,,,,\n");
        assert_eq!(events[0], Event::Other { time: 7.0, kind: "personMoney".into() });
        assert_eq!(events[1], Event::Travelled { time: 8.0, agent: "p1".into() });
        assert_eq!(events[0].agent(), None);
        assert_eq!(events[1].agent(), Some("p1"));
        assert_eq!(events[0].type_name(), "personMoney");
    }

    #[test]
    fn cells_are_trimmed() {
        let events = read_ok("  4 , actstart , p1 ,, L1 , shop ,,\n");
        assert_eq!(
            events[0],
            Event::ActivityStart { time: 4.0, agent: "p1".into(), link: "L1".into(), kind: "shop".into() }
        );
    }

    #[test]
    fn minimal_header_is_enough_for_link_events() {
        let text = "time,type,vehicle,link\n3,entered link,v9,L2\n";
        let events: Vec<_> = crate::EventReader::new(text.as_bytes()).map(|e| e.unwrap()).collect();
        assert_eq!(events, vec![Event::EnteredLink { time: 3.0, vehicle: "v9".into(), link: "L2".into() }]);
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod errors {
    use super::helpers::read;
    use crate::{EventError, EventReader};

    #[test]
    fn missing_required_field_reports_record() {
        let results = read("0,actend,p1,,L1,home,,\n1,departure,p1,,L1,,,\n");
        assert!(results[0].is_ok());
        match &results[1] {
            Err(EventError::MissingField { record, event_type, field }) => {
                assert_eq!(*record, 2);
                assert_eq!(event_type, "departure");
                assert_eq!(*field, "legMode");
            }
            other => panic!("expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn bad_time_is_parse_error() {
        let results = read("noon,actend,p1,,L1,home,,\n");
        assert!(matches!(&results[0], Err(EventError::Parse { record: 1, .. })));
        let results = read("-5,actend,p1,,L1,home,,\n");
        assert!(matches!(&results[0], Err(EventError::Parse { record: 1, .. })));
    }

    #[test]
    fn reader_is_lazy() {
        let text = format!("{}1,travelled,p1,,,,,\n2,travelled,p1,,,,,\n", super::helpers::HEADER);
        let mut reader = EventReader::new(text.as_bytes());
        assert_eq!(reader.records_read(), 0);
        reader.next().unwrap().unwrap();
        assert_eq!(reader.records_read(), 1);
        reader.next().unwrap().unwrap();
        assert!(reader.next().is_none());
    }
}
