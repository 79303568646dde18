//! Link network with per-link temperature profile assignment.
//!
//! # Data layout
//!
//! Links are stored column-wise and indexed by `LinkId`:
//!
//! ```text
//! link_from[l], link_to[l], link_length[l], link_freespeed[l], link_profile[l]
//! ```
//!
//! External string ids are interned once at load time; the event loop then
//! resolves each link name to its `LinkId` and every exposure query is two
//! `Vec` reads plus the profile integral.
//!
//! # Profile assignment
//!
//! An R-tree (via `rstar`) over the profile centroids is bulk-loaded once in
//! [`NetworkIndexBuilder::build`].  Each link takes the profile whose
//! centroid is nearest to the link's source node.  The assignment is fixed
//! for the lifetime of the index.

use log::info;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use hx_core::{Interner, LinkId, NodeId, Point, ProfileId};

use crate::{SpatialError, SpatialResult, TemperatureProfile};

// ── R-tree centroid entry ─────────────────────────────────────────────────────

/// Entry stored in the centroid index: a planar `[x, y]` point with the
/// profile it belongs to.
#[derive(Clone)]
struct CentroidEntry {
    point: [f64; 2],
    id:    ProfileId,
}

impl RTreeObject for CentroidEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for CentroidEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── NetworkIndex ──────────────────────────────────────────────────────────────

/// Read-only link table with each link's assigned temperature profile.
///
/// Do not construct directly; use [`NetworkIndexBuilder`].
pub struct NetworkIndex {
    nodes:    Interner<NodeId>,
    node_pos: Vec<Point>,

    links: Interner<LinkId>,

    // ── Link data (indexed by LinkId) ─────────────────────────────────────
    pub link_from:      Vec<NodeId>,
    pub link_to:        Vec<NodeId>,
    /// Length in metres.
    pub link_length:    Vec<f64>,
    /// Free-flow speed in m/s.
    pub link_freespeed: Vec<f64>,
    pub link_profile:   Vec<ProfileId>,

    profiles: Vec<TemperatureProfile>,
}

impl NetworkIndex {
    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn link_count(&self) -> usize {
        self.link_from.len()
    }

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn profile_count(&self) -> usize {
        self.profiles.len()
    }

    // ── Name resolution ───────────────────────────────────────────────────

    /// Look up a link by its external id.
    #[inline]
    pub fn link(&self, name: &str) -> Option<LinkId> {
        self.links.get(name)
    }

    /// Like [`link`](Self::link), but an unknown id is an error.
    #[inline]
    pub fn resolve(&self, name: &str) -> SpatialResult<LinkId> {
        self.links.get(name).ok_or_else(|| SpatialError::UnknownLink(name.to_owned()))
    }

    #[inline]
    pub fn link_name(&self, link: LinkId) -> &str {
        self.links.name(link)
    }

    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.nodes.get(name)
    }

    pub fn node_pos(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    // ── Link attributes ───────────────────────────────────────────────────

    #[inline]
    pub fn link_length(&self, link: LinkId) -> f64 {
        self.link_length[link.index()]
    }

    /// Free-flow traversal time of `link` in seconds.
    pub fn free_travel_time(&self, link: LinkId) -> f64 {
        let speed = self.link_freespeed[link.index()];
        if speed > 0.0 { self.link_length[link.index()] / speed } else { 0.0 }
    }

    /// The profile assigned to `link`.
    #[inline]
    pub fn profile_of(&self, link: LinkId) -> &TemperatureProfile {
        &self.profiles[self.link_profile[link.index()].index()]
    }

    // ── Exposure queries ──────────────────────────────────────────────────

    /// Ambient temperature on `link` at `time`.
    #[inline]
    pub fn temperature(&self, link: LinkId, time: f64) -> f64 {
        self.profile_of(link).temperature(time)
    }

    /// Integrated ambient exposure on `link` over `[start, stop]`.
    #[inline]
    pub fn exposure(&self, link: LinkId, start: f64, stop: f64) -> f64 {
        self.profile_of(link).exposure(start, stop)
    }
}

// ── NetworkIndexBuilder ───────────────────────────────────────────────────────

/// Construct a [`NetworkIndex`] incrementally, then call [`build`](Self::build).
///
/// Nodes must be added before the links that reference them.  Profiles may
/// be added in any order relative to nodes and links.
///
/// # Example
///
/// ```
/// use hx_core::Point;
/// use hx_spatial::{NetworkIndexBuilder, TemperatureProfile};
///
/// let mut b = NetworkIndexBuilder::new();
/// b.add_node("a", Point::new(0.0, 0.0)).unwrap();
/// b.add_node("b", Point::new(100.0, 0.0)).unwrap();
/// b.add_link("ab", "a", "b", 100.0, 10.0).unwrap();
/// b.add_profile(Point::new(0.0, 0.0), TemperatureProfile::constant("z", 20.0).unwrap()).unwrap();
/// let net = b.build(None).unwrap();
/// let ab = net.resolve("ab").unwrap();
/// assert_eq!(net.exposure(ab, 0.0, 100.0), 2_000.0);
/// ```
#[derive(Default)]
pub struct NetworkIndexBuilder {
    nodes:     Interner<NodeId>,
    node_pos:  Vec<Point>,
    links:     Interner<LinkId>,
    raw_links: Vec<RawLink>,
    profile_names: Interner<ProfileId>,
    centroids: Vec<Point>,
    profiles:  Vec<TemperatureProfile>,
}

struct RawLink {
    from:      NodeId,
    to:        NodeId,
    length:    f64,
    freespeed: f64,
}

impl NetworkIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node at planar position `pos`.
    pub fn add_node(&mut self, name: &str, pos: Point) -> SpatialResult<NodeId> {
        if !pos.is_finite() {
            return Err(SpatialError::Parse(format!("node {name:?} has non-finite coordinates")));
        }
        let (id, fresh) = self.nodes.intern(name);
        if !fresh {
            return Err(SpatialError::DuplicateId { kind: "node", name: name.to_owned() });
        }
        self.node_pos.push(pos);
        Ok(id)
    }

    /// Add a directed link between two previously added nodes.
    pub fn add_link(
        &mut self,
        name: &str,
        from: &str,
        to: &str,
        length: f64,
        freespeed: f64,
    ) -> SpatialResult<LinkId> {
        let from = self.nodes.get(from).ok_or_else(|| SpatialError::UnknownNode(from.to_owned()))?;
        let to = self.nodes.get(to).ok_or_else(|| SpatialError::UnknownNode(to.to_owned()))?;
        if !(length.is_finite() && length >= 0.0) {
            return Err(SpatialError::Parse(format!("link {name:?} has invalid length {length}")));
        }
        let (id, fresh) = self.links.intern(name);
        if !fresh {
            return Err(SpatialError::DuplicateId { kind: "link", name: name.to_owned() });
        }
        self.raw_links.push(RawLink { from, to, length, freespeed });
        Ok(id)
    }

    /// Add a temperature profile whose zone centroid is at `centroid`.
    pub fn add_profile(&mut self, centroid: Point, profile: TemperatureProfile) -> SpatialResult<ProfileId> {
        if !centroid.is_finite() {
            return Err(SpatialError::InvalidProfile {
                name:   profile.name().to_owned(),
                reason: "centroid has non-finite coordinates".into(),
            });
        }
        let (id, fresh) = self.profile_names.intern(profile.name());
        if !fresh {
            return Err(SpatialError::DuplicateId { kind: "profile", name: profile.name().to_owned() });
        }
        self.centroids.push(centroid);
        self.profiles.push(profile);
        Ok(id)
    }

    pub fn link_count(&self) -> usize { self.raw_links.len() }
    pub fn profile_count(&self) -> usize { self.profiles.len() }

    /// Consume the builder, assign a profile to every link, and produce the
    /// index.
    ///
    /// `max_distance` bounds how far a link's source node may be from its
    /// assigned centroid.
    ///
    /// # Errors
    /// [`SpatialError::NoProfile`] if there are links but no profiles;
    /// [`SpatialError::ProfileTooFar`] if a nearest centroid exceeds
    /// `max_distance`.
    pub fn build(self, max_distance: Option<f64>) -> SpatialResult<NetworkIndex> {
        let entries: Vec<CentroidEntry> = self
            .centroids
            .iter()
            .enumerate()
            .map(|(i, pos)| CentroidEntry { point: pos.to_array(), id: ProfileId(i as u32) })
            .collect();
        let centroid_idx = RTree::bulk_load(entries);

        let mut link_profile = Vec::with_capacity(self.raw_links.len());
        for (i, raw) in self.raw_links.iter().enumerate() {
            let source = self.node_pos[raw.from.index()];
            let link_name = || self.links.name(LinkId(i as u32)).to_owned();
            let nearest = centroid_idx
                .nearest_neighbor(&source.to_array())
                .ok_or_else(|| SpatialError::NoProfile { link: link_name() })?;
            if let Some(limit) = max_distance {
                let distance = source.distance(self.centroids[nearest.id.index()]);
                if distance > limit {
                    return Err(SpatialError::ProfileTooFar {
                        link: link_name(),
                        profile: self.profile_names.name(nearest.id).to_owned(),
                        distance,
                        limit,
                    });
                }
            }
            link_profile.push(nearest.id);
        }

        info!(
            "network index: {} nodes, {} links, {} temperature profiles",
            self.node_pos.len(),
            self.raw_links.len(),
            self.profiles.len()
        );

        Ok(NetworkIndex {
            link_from:      self.raw_links.iter().map(|l| l.from).collect(),
            link_to:        self.raw_links.iter().map(|l| l.to).collect(),
            link_length:    self.raw_links.iter().map(|l| l.length).collect(),
            link_freespeed: self.raw_links.iter().map(|l| l.freespeed).collect(),
            link_profile,
            nodes:    self.nodes,
            node_pos: self.node_pos,
            links:    self.links,
            profiles: self.profiles,
        })
    }
}
