//! CSV loaders for the static tables.
//!
//! # CSV formats
//!
//! ```csv
//! # nodes.csv
//! node_id,x,y
//! n1,0.0,0.0
//!
//! # links.csv
//! link_id,from_node,to_node,length,freespeed
//! L1,n1,n2,100.0,13.9
//!
//! # centroids.csv
//! profile_id,x,y
//! z1,50.0,0.0
//!
//! # temperatures.csv   (steps of one profile must be exactly 0..S, any order)
//! profile_id,step,temperature
//! z1,0,18.5
//!
//! # routes.csv          (links is a space-separated ordered list)
//! mode,start_link,end_link,distance,links
//! walk,L1,L3,250.0,L1 L2 L3
//! ```
//!
//! Every loader has a path variant and a `Read` variant; the latter is what
//! the tests use with in-memory buffers.

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use hx_core::Point;

use crate::{NetworkIndex, NetworkIndexBuilder, Route, RouteTable, SpatialError, SpatialResult, TemperatureProfile};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NodeRecord {
    node_id: String,
    x:       f64,
    y:       f64,
}

#[derive(Deserialize)]
struct LinkRecord {
    link_id:   String,
    from_node: String,
    to_node:   String,
    length:    f64,
    freespeed: f64,
}

#[derive(Deserialize)]
struct CentroidRecord {
    profile_id: String,
    x:          f64,
    y:          f64,
}

#[derive(Deserialize)]
struct TemperatureRecord {
    profile_id:  String,
    step:        usize,
    temperature: f64,
}

#[derive(Deserialize)]
struct RouteRecord {
    mode:       String,
    start_link: String,
    end_link:   String,
    distance:   f64,
    links:      String,
}

// ── Network ───────────────────────────────────────────────────────────────────

/// File locations of the four network tables.
#[derive(Clone, Debug)]
pub struct NetworkFiles<'a> {
    pub nodes:        &'a Path,
    pub links:        &'a Path,
    pub centroids:    &'a Path,
    pub temperatures: &'a Path,
}

/// Load and build the network index from CSV files.
pub fn load_network_csv(files: &NetworkFiles<'_>, max_distance: Option<f64>) -> SpatialResult<NetworkIndex> {
    load_network_reader(
        File::open(files.nodes)?,
        File::open(files.links)?,
        File::open(files.centroids)?,
        File::open(files.temperatures)?,
        max_distance,
    )
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn load_network_reader<N, L, C, T>(
    nodes: N,
    links: L,
    centroids: C,
    temperatures: T,
    max_distance: Option<f64>,
) -> SpatialResult<NetworkIndex>
where
    N: Read,
    L: Read,
    C: Read,
    T: Read,
{
    let mut b = NetworkIndexBuilder::new();

    for row in csv::Reader::from_reader(nodes).deserialize::<NodeRecord>() {
        let row = row.map_err(parse_err)?;
        b.add_node(&row.node_id, Point::new(row.x, row.y))?;
    }
    for row in csv::Reader::from_reader(links).deserialize::<LinkRecord>() {
        let row = row.map_err(parse_err)?;
        b.add_link(&row.link_id, &row.from_node, &row.to_node, row.length, row.freespeed)?;
    }

    // ── Profiles: samples keyed by step, joined to centroids by id ────────
    let mut samples: HashMap<String, BTreeMap<usize, f64>> = HashMap::new();
    for row in csv::Reader::from_reader(temperatures).deserialize::<TemperatureRecord>() {
        let row = row.map_err(parse_err)?;
        let steps = samples.entry(row.profile_id.clone()).or_default();
        if steps.insert(row.step, row.temperature).is_some() {
            return Err(SpatialError::InvalidProfile {
                name:   row.profile_id,
                reason: format!("step {} given twice", row.step),
            });
        }
    }

    for row in csv::Reader::from_reader(centroids).deserialize::<CentroidRecord>() {
        let row = row.map_err(parse_err)?;
        let steps = samples.remove(&row.profile_id).unwrap_or_default();
        let profile = TemperatureProfile::new(&row.profile_id, contiguous(&row.profile_id, steps)?)?;
        b.add_profile(Point::new(row.x, row.y), profile)?;
    }
    if let Some(orphan) = samples.into_keys().min() {
        return Err(SpatialError::UnknownProfile(orphan));
    }

    b.build(max_distance)
}

/// Samples in step order, requiring steps to be exactly `0..S`.
fn contiguous(name: &str, steps: BTreeMap<usize, f64>) -> SpatialResult<Vec<f64>> {
    if let Some((&last, _)) = steps.last_key_value() {
        if last + 1 != steps.len() {
            return Err(SpatialError::InvalidProfile {
                name:   name.to_owned(),
                reason: format!("steps are not contiguous from 0 (highest {last}, count {})", steps.len()),
            });
        }
    }
    Ok(steps.into_values().collect())
}

// ── Routes ────────────────────────────────────────────────────────────────────

/// Load the route table, resolving every link against `network`.
pub fn load_routes_csv(path: &Path, network: &NetworkIndex) -> SpatialResult<RouteTable> {
    load_routes_reader(File::open(path)?, network)
}

/// Like [`load_routes_csv`] but accepts any `Read` source.
///
/// Duplicate `(mode, start_link, end_link)` keys keep the first row.
pub fn load_routes_reader<R: Read>(reader: R, network: &NetworkIndex) -> SpatialResult<RouteTable> {
    let mut table = RouteTable::new();
    let mut duplicates = 0usize;

    for row in csv::Reader::from_reader(reader).deserialize::<RouteRecord>() {
        let row = row.map_err(parse_err)?;
        let start = network.resolve(&row.start_link)?;
        let end = network.resolve(&row.end_link)?;
        let links = row
            .links
            .split_whitespace()
            .map(|l| network.resolve(l))
            .collect::<SpatialResult<Vec<_>>>()?;
        if !table.insert(&row.mode, start, end, Route { links, distance: row.distance }) {
            duplicates += 1;
        }
    }

    if duplicates > 0 {
        debug!("route table: {duplicates} duplicate rows ignored");
    }
    info!("route table: {} routes", table.len());
    Ok(table)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_err(e: csv::Error) -> SpatialError {
    SpatialError::Parse(e.to_string())
}
