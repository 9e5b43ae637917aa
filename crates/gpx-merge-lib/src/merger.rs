//! Merger - Top-level orchestrator for a merge run
//!
//! Owns the aggregate document and the run statistics, and feeds every input
//! document through the waypoint and track deduplicators. Errors never escape a
//! single file: they are logged, recorded in the statistics and the run moves on.

use crate::aggregate::AggregateDocument;
use crate::stats::RunStatistics;
use crate::tree::Node;
use crate::{Result, track, waypoint, xml};
use std::fmt::Display;

/// Accumulates any number of GPX documents into one
#[derive(Debug, Default)]
pub struct Merger {
    aggregate: AggregateDocument,
    stats: RunStatistics,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Merger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the outcome of reading and parsing one input file.
    ///
    /// `Err` outcomes (unreadable file, malformed XML) are recorded as failures.
    pub fn merge_file<E: Display>(&mut self, file: &str, document: std::result::Result<Node, E>) {
        self.stats.files_read += 1;
        match document {
            Ok(document) => self.merge_tree(file, document),
            Err(err) => self.fail(file, err),
        }
    }

    /// Parse XML text and merge it
    pub fn merge_str(&mut self, file: &str, text: &str) {
        self.merge_file(file, xml::parse(text));
    }

    /// Record an input file that failed before it could be read (e.g. while listing
    /// files). It still counts as an attempted file.
    pub fn record_failure(&mut self, file: &str, message: impl Display) {
        self.stats.files_read += 1;
        self.fail(file, message);
    }

    fn merge_tree(&mut self, file: &str, document: Node) {
        let Some(gpx) = (match document {
            Node::Element(mut root) => root.take("gpx"),
            _ => None,
        }) else {
            tracing::debug!("{file}: no gpx root, skipping");
            self.stats.not_gpx += 1;
            return;
        };

        for gpx in gpx.into_items() {
            // A blank <gpx/> has nothing to merge
            let Node::Element(mut gpx) = gpx else {
                continue;
            };
            let rebound = self.aggregate.absorb_namespaces(&gpx);

            // Sections fail independently of each other
            if let Some(waypoints) = gpx.take("wpt")
                && let Err(err) = self.merge_waypoints(file, waypoints, &rebound)
            {
                self.fail(file, err);
            }
            if let Some(tracks) = gpx.take("trk")
                && let Err(err) = self.merge_tracks(file, tracks, &rebound)
            {
                self.fail(file, err);
            }
        }
    }

    fn merge_waypoints(
        &mut self,
        file: &str,
        waypoints: Node,
        rebound: &[(String, String)],
    ) -> Result<()> {
        let waypoints = waypoints.into_items();
        let total = waypoints.len();
        let mut added = 0;
        for wpt in waypoints {
            if waypoint::consider(bind_namespaces(wpt, rebound), &mut self.aggregate, &mut self.stats)? {
                added += 1;
            }
        }
        tracing::debug!("{file}: {added}/{total} new waypoints");
        Ok(())
    }

    fn merge_tracks(
        &mut self,
        file: &str,
        tracks: Node,
        rebound: &[(String, String)],
    ) -> Result<()> {
        let tracks = tracks.into_items();
        let total = tracks.len();
        let mut added = 0;
        for trk in tracks {
            if let Some(track::TrackOutcome::New | track::TrackOutcome::ConflictTreatedAsNew) =
                track::merge_track(bind_namespaces(trk, rebound), &mut self.aggregate, &mut self.stats)?
            {
                added += 1;
            }
        }
        tracing::debug!("{file}: {added}/{total} new tracks");
        Ok(())
    }

    fn fail(&mut self, file: &str, err: impl Display) {
        tracing::error!("{file}: {err}");
        self.stats.record_failure(file, err.to_string());
    }

    /// Statistics so far
    #[inline]
    pub fn stats(&self) -> &RunStatistics {
        &self.stats
    }

    /// Output document so far
    #[inline]
    pub fn aggregate(&self) -> &AggregateDocument {
        &self.aggregate
    }

    /// End the run: the finalized output tree and the final statistics
    pub fn finish(self, creator: &str) -> (Node, RunStatistics) {
        (self.aggregate.finalize(creator), self.stats)
    }
}

/// Declare `rebound` prefixes on an item copied from a source whose bindings differ
/// from the output root. Declarations the item already carries win.
fn bind_namespaces(item: Node, rebound: &[(String, String)]) -> Node {
    match item {
        Node::Element(mut element) if !rebound.is_empty() => {
            for (key, uri) in rebound {
                if element.get(key).is_none() {
                    element.insert(key.as_str(), uri.as_str());
                }
            }
            Node::Element(element)
        }
        other => other,
    }
}
