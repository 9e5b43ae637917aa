//! AggregateDocument - the single output document built up during a run
//!
//! Waypoints and tracks are kept in first-seen order. Hash indexes sit beside the
//! ordered sequences so identity lookups don't scan everything merged so far.

use crate::tree::{Element, Node};
use crate::waypoint::WaypointKey;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

/// Version attribute written on the output root
pub const GPX_VERSION: &str = "1.1";

/// Default namespace written on the output root
pub const GPX_NAMESPACE: &str = "http://www.topografix.com/GPX/1/1";

const NAMESPACE_DECLARATION: &str = "@xmlns:";

/// Accumulated output of a merge run
#[derive(Debug, Default)]
pub struct AggregateDocument {
    /// Unique waypoints in first-seen order
    waypoints: Vec<Node>,
    /// Identity keys of `waypoints`
    waypoint_keys: HashSet<WaypointKey>,
    /// Accepted tracks in first-seen order
    tracks: Vec<Node>,
    /// Point count of each accepted track, parallel to `tracks`
    track_points: Vec<usize>,
    /// Positions in `tracks` by track name
    named_tracks: HashMap<String, Vec<usize>>,
    /// Positions in `tracks` of tracks without a name
    unnamed_tracks: Vec<usize>,
    /// Prefixed namespace declarations seen on source roots (first seen wins)
    namespaces: IndexMap<String, String>,
}

impl AggregateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a waypoint with this identity has already been kept
    #[inline]
    pub fn contains_waypoint(&self, key: &WaypointKey) -> bool {
        self.waypoint_keys.contains(key)
    }

    pub(crate) fn push_waypoint(&mut self, key: WaypointKey, waypoint: Node) {
        self.waypoint_keys.insert(key);
        self.waypoints.push(waypoint);
    }

    /// Positions of accepted tracks sharing `name` (`None` matches unnamed tracks)
    pub fn tracks_named(&self, name: Option<&str>) -> &[usize] {
        match name {
            Some(name) => self.named_tracks.get(name).map(Vec::as_slice).unwrap_or(&[]),
            None => &self.unnamed_tracks,
        }
    }

    /// Ledger entry for the track at `index`
    #[inline]
    pub fn track_point_count(&self, index: usize) -> Option<usize> {
        self.track_points.get(index).copied()
    }

    pub(crate) fn push_track(&mut self, name: Option<String>, track: Node, point_count: usize) {
        let index = self.tracks.len();
        self.tracks.push(track);
        self.track_points.push(point_count);
        match name {
            Some(name) => self.named_tracks.entry(name).or_default().push(index),
            None => self.unnamed_tracks.push(index),
        }
    }

    /// Remember `xmlns:prefix` declarations of a source `gpx` root so extension
    /// elements copied verbatim stay bound in the output.
    ///
    /// The output root keeps the first binding of each prefix. Declarations that
    /// rebind an already-bound prefix to another URI are returned; they have to be
    /// carried on the items copied from this source instead.
    pub(crate) fn absorb_namespaces(&mut self, gpx: &Element) -> Vec<(String, String)> {
        let mut rebound = Vec::new();
        for (key, value) in gpx.iter() {
            let Some(uri) = value.as_text().filter(|_| key.starts_with(NAMESPACE_DECLARATION)) else {
                continue;
            };
            match self.namespaces.get(key) {
                None => {
                    self.namespaces.insert(key.to_string(), uri.to_string());
                }
                Some(bound) if bound != uri => {
                    tracing::debug!("{key} rebound from {bound} to {uri}");
                    rebound.push((key.to_string(), uri.to_string()));
                }
                Some(_) => {}
            }
        }
        rebound
    }

    pub fn waypoints(&self) -> &[Node] {
        &self.waypoints
    }

    pub fn tracks(&self) -> &[Node] {
        &self.tracks
    }

    /// Produce the output tree: `{ gpx: { @version, @creator, @xmlns, wpt, trk } }`.
    ///
    /// Consumes the aggregate; the point-count ledger is not part of the output.
    pub fn finalize(self, creator: &str) -> Node {
        tracing::debug!(
            "Finalizing aggregate: {} waypoints, {} tracks",
            self.waypoints.len(),
            self.tracks.len()
        );

        let mut gpx = Element::new()
            .with_attribute("version", GPX_VERSION)
            .with_attribute("creator", creator)
            .with_attribute("xmlns", GPX_NAMESPACE);
        for (key, uri) in self.namespaces {
            gpx.insert(key, Node::Text(uri));
        }
        if !self.waypoints.is_empty() {
            gpx.insert("wpt", Node::List(self.waypoints));
        }
        if !self.tracks.is_empty() {
            gpx.insert("trk", Node::List(self.tracks));
        }

        Node::Element(Element::new().with("gpx", gpx))
    }
}
