//! Integration tests for hx-output.

#[cfg(test)]
mod helpers {
    use hx_agent::{ActivityRecord, AgentRecord, ExportBatch, LegRecord, SegmentRecord};

    /// One agent: home, a two-segment car leg, and an aborted work activity.
    pub fn batch() -> ExportBatch {
        ExportBatch {
            agents: vec![AgentRecord {
                agent_id:       "p1".into(),
                itinerary_size: 3,
                total_exposure: 9_000.0,
                aborted:        true,
            }],
            activities: vec![
                ActivityRecord {
                    agent_id: "p1".into(),
                    idx:      0,
                    kind:     "home".into(),
                    link:     "L1".into(),
                    start:    0.0,
                    end:      Some(0.0),
                    duration: Some(0.0),
                    exposure: Some(0.0),
                    aborted:  false,
                },
                ActivityRecord {
                    agent_id: "p1".into(),
                    idx:      2,
                    kind:     "work".into(),
                    link:     "L3".into(),
                    start:    400.0,
                    end:      None,
                    duration: None,
                    exposure: None,
                    aborted:  true,
                },
            ],
            legs: vec![LegRecord {
                leg_id:     0,
                agent_id:   "p1".into(),
                idx:        1,
                mode:       "car".into(),
                start_link: "L1".into(),
                end_link:   Some("L3".into()),
                start:      0.0,
                end:        Some(400.0),
                duration:   Some(400.0),
                exposure:   Some(9_000.0),
                aborted:    false,
            }],
            segments: vec![
                SegmentRecord { leg_id: 0, idx: 0, link: "L1".into(), start: 0.0, end: 100.0, exposure: 2_000.0 },
                SegmentRecord { leg_id: 0, idx: 1, link: "L3".into(), start: 100.0, end: 400.0, exposure: 7_000.0 },
            ],
        }
    }
}

// ── SQLite ────────────────────────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod sqlite_tests {
    use std::path::Path;

    use rusqlite::Connection;
    use tempfile::TempDir;

    use super::helpers::batch;
    use crate::{ExportStore, Exporter, OutputError, SqliteStore};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0)).unwrap()
    }

    fn staging_tables(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name LIKE 'staging_%'",
            [],
            |r| r.get(0),
        )
        .unwrap()
    }

    fn export(path: &Path) -> crate::OutputResult<hx_agent::RowCounts> {
        let b = batch();
        let expected = b.counts();
        let mut exporter = Exporter::begin(SqliteStore::open(path)?, 2)?;
        exporter.push(b)?;
        exporter.commit(expected)
    }

    #[test]
    fn commit_publishes_every_table() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");
        let rows = export(&path).unwrap();
        assert_eq!(rows, batch().counts());

        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "agents"), 1);
        assert_eq!(count(&conn, "activities"), 2);
        assert_eq!(count(&conn, "legs"), 1);
        assert_eq!(count(&conn, "segments"), 2);
        assert_eq!(staging_tables(&conn), 0);
    }

    #[test]
    fn aborted_fields_are_null() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");
        export(&path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let (end, exposure, aborted): (Option<f64>, Option<f64>, bool) = conn
            .query_row(
                "SELECT end_time, exposure, aborted FROM activities WHERE kind = 'work'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!(end, None);
        assert_eq!(exposure, None);
        assert!(aborted);
    }

    #[test]
    fn indexes_exist_after_publish() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");
        export(&path).unwrap();
        let conn = Connection::open(&path).unwrap();
        let n: i64 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(n, 3);
    }

    #[test]
    fn mismatch_leaves_canonical_untouched() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");
        export(&path).unwrap();

        // Second run claims one more segment than it submitted.
        let b = batch();
        let mut expected = b.counts();
        expected.segments += 1;
        let mut exporter = Exporter::begin(SqliteStore::open(&path).unwrap(), 100).unwrap();
        let mut second = b.clone();
        second.segments.truncate(1);
        second.agents[0].agent_id = "p2".into();
        exporter.push(second).unwrap();
        let err = exporter.commit(expected).unwrap_err();
        assert!(matches!(err, OutputError::Inconsistent { table: "segments", .. }), "{err}");

        let conn = Connection::open(&path).unwrap();
        let agent: String = conn.query_row("SELECT agent_id FROM agents", [], |r| r.get(0)).unwrap();
        assert_eq!(agent, "p1");
        assert_eq!(count(&conn, "segments"), 2);
        assert_eq!(staging_tables(&conn), 0);
    }

    #[test]
    fn expected_population_is_checked() {
        let mut exporter = Exporter::begin(SqliteStore::in_memory().unwrap(), 10).unwrap();
        exporter.expect_agents(2);
        let b = batch();
        let expected = b.counts();
        exporter.push(b).unwrap();
        let err = exporter.commit(expected).unwrap_err();
        assert!(matches!(err, OutputError::Inconsistent { table: "agents", expected: 2, staged: 1 }));
    }

    #[test]
    fn rerun_is_deterministic() {
        let dump = |path: &Path| -> Vec<String> {
            let conn = Connection::open(path).unwrap();
            let mut stmt = conn
                .prepare("SELECT leg_id, idx, link, start_time, end_time, exposure FROM segments ORDER BY leg_id, idx")
                .unwrap();
            stmt.query_map([], |r| {
                Ok(format!(
                    "{}|{}|{}|{}|{}|{}",
                    r.get::<_, i64>(0)?,
                    r.get::<_, i64>(1)?,
                    r.get::<_, String>(2)?,
                    r.get::<_, f64>(3)?,
                    r.get::<_, f64>(4)?,
                    r.get::<_, f64>(5)?
                ))
            })
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
        };

        let dir = tmp();
        let path = dir.path().join("exposure.db");
        export(&path).unwrap();
        let first = dump(&path);
        export(&path).unwrap();
        assert_eq!(dump(&path), first);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn stale_staging_is_dropped_not_appended() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");

        // A run that staged rows and then died without commit or discard.
        {
            let mut exporter = Exporter::begin(SqliteStore::open(&path).unwrap(), 1).unwrap();
            exporter.push(batch()).unwrap();
        }
        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "staging_segments"), 2);
        drop(conn);

        let rows = export(&path).unwrap();
        assert_eq!(rows, batch().counts());
        let conn = Connection::open(&path).unwrap();
        assert_eq!(count(&conn, "segments"), 2);
    }

    #[test]
    fn discard_drops_staging() {
        let dir = tmp();
        let path = dir.path().join("exposure.db");
        let mut exporter = Exporter::begin(SqliteStore::open(&path).unwrap(), 1).unwrap();
        exporter.push(batch()).unwrap();
        exporter.discard().unwrap();

        let conn = Connection::open(&path).unwrap();
        assert_eq!(staging_tables(&conn), 0);
    }

    #[test]
    fn store_counts_what_it_staged() {
        let mut store = SqliteStore::in_memory().unwrap();
        store.reset_staging().unwrap();
        store.stage(&batch()).unwrap();
        store.stage(&batch()).unwrap();
        let counts = store.staged_counts().unwrap();
        assert_eq!(counts.segments, 4);
        assert_eq!(counts.agents, 2);
    }
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod csv_tests {
    use std::fs;

    use tempfile::TempDir;

    use super::helpers::batch;
    use crate::{CsvStore, Exporter, OutputError, Table};

    fn tmp() -> TempDir {
        tempfile::tempdir().expect("create temp dir")
    }

    fn records(path: &std::path::Path) -> Vec<csv::StringRecord> {
        csv::Reader::from_path(path).unwrap().records().map(|r| r.unwrap()).collect()
    }

    #[test]
    fn commit_swaps_staging_into_place() {
        let root = tmp();
        let out = root.path().join("out");
        let b = batch();
        let expected = b.counts();
        let mut exporter = Exporter::begin(CsvStore::new(&out).unwrap(), 10).unwrap();
        exporter.push(b).unwrap();
        exporter.commit(expected).unwrap();

        assert!(!root.path().join("out.staging").exists());
        for table in Table::ALL {
            let path = out.join(format!("{}.csv", table.name()));
            let mut rdr = csv::Reader::from_path(&path).unwrap();
            let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
            assert_eq!(headers, table.columns());
        }

        let activities = records(&out.join("activities.csv"));
        assert_eq!(activities.len(), 2);
        assert_eq!(&activities[1][2], "work");
        assert_eq!(&activities[1][5], ""); // end_time
        assert_eq!(&activities[1][8], "1"); // aborted

        let segments = records(&out.join("segments.csv"));
        assert_eq!(&segments[0][5], "2000");
    }

    #[test]
    fn second_commit_replaces_the_first() {
        let root = tmp();
        let out = root.path().join("out");
        for agent in ["p1", "p2"] {
            let mut b = batch();
            b.agents[0].agent_id = agent.into();
            let expected = b.counts();
            let mut exporter = Exporter::begin(CsvStore::new(&out).unwrap(), 1).unwrap();
            exporter.push(b).unwrap();
            exporter.commit(expected).unwrap();
        }
        let agents = records(&out.join("agents.csv"));
        assert_eq!(agents.len(), 1);
        assert_eq!(&agents[0][0], "p2");
    }

    #[test]
    fn mismatch_keeps_previous_export() {
        let root = tmp();
        let out = root.path().join("out");
        let b = batch();
        let expected = b.counts();
        let mut exporter = Exporter::begin(CsvStore::new(&out).unwrap(), 1).unwrap();
        exporter.push(b).unwrap();
        exporter.commit(expected).unwrap();

        let mut exporter = Exporter::begin(CsvStore::new(&out).unwrap(), 1).unwrap();
        exporter.push(batch()).unwrap();
        let mut wrong = expected;
        wrong.legs = 5;
        let err = exporter.commit(wrong).unwrap_err();
        assert!(matches!(err, OutputError::Inconsistent { table: "legs", expected: 5, staged: 1 }));

        assert!(!root.path().join("out.staging").exists());
        assert_eq!(records(&out.join("segments.csv")).len(), 2);
    }

    #[test]
    fn stale_staging_directory_is_replaced() {
        let root = tmp();
        let out = root.path().join("out");
        let stale = root.path().join("out.staging");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("segments.csv"), "leg_id,idx,link,start_time,end_time,exposure\n9,9,L9,0,1,1\n").unwrap();

        let b = batch();
        let expected = b.counts();
        let mut exporter = Exporter::begin(CsvStore::new(&out).unwrap(), 1).unwrap();
        exporter.push(b).unwrap();
        assert_eq!(exporter.commit(expected).unwrap(), expected);
        assert_eq!(records(&out.join("segments.csv")).len(), 2);
    }

    #[test]
    fn failed_swap_restores_the_previous_export() {
        let root = tmp();
        let out = root.path().join("out");
        fs::create_dir(&out).unwrap();
        fs::write(out.join("agents.csv"), "agent_id\n").unwrap();
        let staging = root.path().join("out.staging");

        // Staging was never written, so moving it into place fails.
        let result = crate::csv::swap_into_place(&staging, &out);
        assert!(matches!(result, Err(OutputError::Io(_))));
        assert_eq!(fs::read_to_string(out.join("agents.csv")).unwrap(), "agent_id\n");
        assert!(!root.path().join("out.staging.old").exists());
    }
}

// ── Driven by the processor ───────────────────────────────────────────────────

#[cfg(all(test, feature = "sqlite"))]
mod pipeline {
    use hx_core::{EngineConfig, Point};
    use hx_engine::{NoopObserver, ProcessorBuilder};
    use hx_events::EventReader;
    use hx_spatial::{NetworkIndexBuilder, TemperatureProfile};
    use rusqlite::Connection;

    use crate::{Exporter, SqliteStore};

    #[test]
    fn processor_output_lands_in_sqlite() {
        let mut b = NetworkIndexBuilder::new();
        b.add_node("n0", Point::new(0.0, 0.0)).unwrap();
        b.add_node("n1", Point::new(100.0, 0.0)).unwrap();
        b.add_node("n2", Point::new(300.0, 0.0)).unwrap();
        b.add_link("L1", "n0", "n1", 100.0, 10.0).unwrap();
        b.add_link("L2", "n1", "n2", 200.0, 10.0).unwrap();
        b.add_profile(Point::new(0.0, 0.0), TemperatureProfile::constant("flat", 20.0).unwrap()).unwrap();
        let net = b.build(None).unwrap();

        let log = "time,type,person,vehicle,link,actType,legMode,vehicleType\n\
                   0,departure,p1,,L1,,walk,\n\
                   0,entered link,,w1,L1,,,\n\
                   100,left link,,w1,L1,,,\n\
                   100,arrival,p1,,L2,,walk,\n\
                   100,actstart,p1,,L2,home,,\n";

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exposure.db");
        let mut exporter = Exporter::begin(SqliteStore::open(&path).unwrap(), 1_000).unwrap();
        let config = EngineConfig { flush_interval: 2, ..Default::default() };
        let summary = ProcessorBuilder::new(config, &net)
            .build()
            .unwrap()
            .run(EventReader::new(log.as_bytes()), &mut exporter, &mut NoopObserver)
            .unwrap();
        let rows = exporter.commit(summary.rows).unwrap();
        assert_eq!(rows, summary.rows);

        let conn = Connection::open(&path).unwrap();
        let exposure: f64 = conn.query_row("SELECT exposure FROM legs", [], |r| r.get(0)).unwrap();
        assert_eq!(exposure, 2_000.0);
        let total: f64 = conn.query_row("SELECT total_exposure FROM agents", [], |r| r.get(0)).unwrap();
        assert_eq!(total, 2_000.0);
    }
}
