//! Track validation, identity and conflict handling
//!
//! A track is usable only when it has at least one `trkseg` and every segment has
//! at least one `trkpt`. Usable tracks are then matched by name against the tracks
//! already kept:
//!
//! - no track of that name: kept ([`TrackOutcome::New`])
//! - a track of that name with the same point count: dropped ([`TrackOutcome::Duplicate`])
//! - only tracks of that name with other point counts: kept as another entry with the
//!   same name and logged ([`TrackOutcome::ConflictTreatedAsNew`])

use crate::aggregate::AggregateDocument;
use crate::stats::RunStatistics;
use crate::tree::Node;
use crate::{MergeError, Result};

/// Result of checking a track's structure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Validation {
    /// At least one segment, and no segment without points
    pub valid: bool,
    /// Points summed over all segments, counted even for invalid tracks
    pub point_count: usize,
}

/// What happened to a valid track offered to the aggregate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackOutcome {
    New,
    Duplicate,
    ConflictTreatedAsNew,
}

/// Name of a track, if it has one
pub fn track_name(track: &Node) -> Option<&str> {
    track.as_element()?.text("name")
}

/// Check the segment/point structure of a `trk` node.
///
/// A bare `trkseg` or `trkpt` counts as a one-element sequence. Errors are
/// reserved for shapes no XML source can produce (text where a track should be,
/// nested lists).
pub fn validate(track: &Node) -> Result<Validation> {
    let element = match track {
        Node::Element(element) => element,
        node if node.is_blank() => {
            return Ok(Validation {
                valid: false,
                point_count: 0,
            });
        }
        Node::Text(text) => {
            return Err(MergeError::Malformed {
                section: "track",
                reason: format!("unexpected text content {text:?}"),
            });
        }
        Node::List(_) => {
            return Err(MergeError::Malformed {
                section: "track",
                reason: "nested track list".to_string(),
            });
        }
    };

    let Some(segments) = element.get("trkseg") else {
        return Ok(Validation {
            valid: false,
            point_count: 0,
        });
    };

    let segments = segments.items();
    let mut valid = !segments.is_empty();
    let mut point_count = 0;

    for segment in segments {
        let points = match segment {
            Node::List(_) => {
                return Err(MergeError::Malformed {
                    section: "track",
                    reason: "nested segment list".to_string(),
                });
            }
            _ => segment.as_element().and_then(|seg| seg.get("trkpt")),
        };

        let Some(points) = points else {
            // Keep counting the remaining segments
            valid = false;
            continue;
        };

        let points = points.items();
        if points.iter().any(|point| matches!(point, Node::List(_))) {
            return Err(MergeError::Malformed {
                section: "track",
                reason: "nested point list".to_string(),
            });
        }
        if points.is_empty() {
            valid = false;
        }
        point_count += points.len();
    }

    Ok(Validation { valid, point_count })
}

/// Offer a valid track with `point_count` points to the aggregate.
pub fn consider(
    track: Node,
    point_count: usize,
    aggregate: &mut AggregateDocument,
    stats: &mut RunStatistics,
) -> TrackOutcome {
    let name = track_name(&track).map(str::to_string);
    let kept_counts: Vec<usize> = aggregate
        .tracks_named(name.as_deref())
        .iter()
        .filter_map(|&index| aggregate.track_point_count(index))
        .collect();

    let outcome = if kept_counts.is_empty() {
        TrackOutcome::New
    } else if kept_counts.contains(&point_count) {
        tracing::debug!("Duplicate track {:?} ({} points)", name, point_count);
        stats.duplicate_tracks += 1;
        return TrackOutcome::Duplicate;
    } else {
        tracing::warn!(
            "Track {:?} has {} points but the kept track(s) of that name have {:?}; keeping both",
            name,
            point_count,
            kept_counts
        );
        stats.conflicting_tracks += 1;
        TrackOutcome::ConflictTreatedAsNew
    };

    aggregate.push_track(name, track, point_count);
    stats.unique_tracks += 1;
    stats.unique_track_points += point_count;
    outcome
}

/// Validate a track and, when usable, offer it to the aggregate.
///
/// Returns `None` for tracks rejected as empty.
pub fn merge_track(
    track: Node,
    aggregate: &mut AggregateDocument,
    stats: &mut RunStatistics,
) -> Result<Option<TrackOutcome>> {
    let validation = validate(&track)?;
    stats.input_tracks += 1;

    if !validation.valid {
        tracing::info!(
            "Skipping track {:?}: missing segments or points",
            track_name(&track)
        );
        stats.empty_tracks += 1;
        return Ok(None);
    }

    stats.valid_tracks += 1;
    Ok(Some(consider(track, validation.point_count, aggregate, stats)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn point(i: usize) -> Node {
        Node::from(
            Element::new()
                .with_attribute("lat", format!("51.{i}"))
                .with_attribute("lon", format!("-0.{i}")),
        )
    }

    fn segment(points: usize) -> Node {
        let mut seg = Element::new();
        for i in 0..points {
            seg.append("trkpt", point(i));
        }
        Node::from(seg)
    }

    fn track(name: Option<&str>, segments: &[usize]) -> Node {
        let mut trk = Element::new();
        if let Some(name) = name {
            trk.insert("name", name);
        }
        for &points in segments {
            trk.append("trkseg", segment(points));
        }
        Node::from(trk)
    }

    #[test]
    fn test_validate_counts_across_segments() {
        let validation = validate(&track(Some("A"), &[3, 4])).unwrap();
        assert_eq!(
            validation,
            Validation {
                valid: true,
                point_count: 7
            }
        );
    }

    #[test]
    fn test_validate_bare_segment_and_point() {
        // One <trkseg> holding one <trkpt>: both bare, not lists
        let trk = track(Some("A"), &[1]);
        let seg = trk.as_element().unwrap().get("trkseg").unwrap();
        assert!(matches!(seg, Node::Element(_)));

        assert_eq!(validate(&trk).unwrap().point_count, 1);
        assert!(validate(&trk).unwrap().valid);
    }

    #[test]
    fn test_validate_without_segments() {
        let trk = Node::from(Element::new().with("name", "A"));
        assert!(!validate(&trk).unwrap().valid);
        assert!(!validate(&Node::from("")).unwrap().valid);
    }

    #[test]
    fn test_validate_partial_segments_rejected() {
        let mut trk = Element::new().with("name", "A");
        trk.append("trkseg", segment(5));
        trk.append("trkseg", Node::from(""));

        let validation = validate(&Node::from(trk)).unwrap();
        assert!(!validation.valid);
        assert_eq!(validation.point_count, 5);
    }

    #[test]
    fn test_validate_empty_point_list() {
        let trk = Element::new().with("trkseg", Element::new().with("trkpt", Node::List(Vec::new())));
        assert!(!validate(&Node::from(trk)).unwrap().valid);
    }

    #[test]
    fn test_validate_rejects_text_track() {
        assert!(validate(&Node::from("not a track")).is_err());
    }

    #[test]
    fn test_conflicting_counts_keep_both() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        let first = merge_track(track(Some("Loop"), &[10]), &mut aggregate, &mut stats).unwrap();
        let second = merge_track(track(Some("Loop"), &[12]), &mut aggregate, &mut stats).unwrap();

        assert_eq!(first, Some(TrackOutcome::New));
        assert_eq!(second, Some(TrackOutcome::ConflictTreatedAsNew));
        assert_eq!(aggregate.tracks().len(), 2);
        assert_eq!(stats.unique_tracks, 2);
        assert_eq!(stats.unique_track_points, 22);
        assert_eq!(stats.duplicate_tracks, 0);
        assert_eq!(stats.conflicting_tracks, 1);
    }

    #[test]
    fn test_duplicate_matches_any_kept_count() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        for points in [10, 12, 12, 10] {
            merge_track(track(Some("Loop"), &[points]), &mut aggregate, &mut stats).unwrap();
        }

        assert_eq!(aggregate.tracks().len(), 2);
        assert_eq!(stats.duplicate_tracks, 2);
        assert_eq!(stats.unique_tracks, 2);
    }

    #[test]
    fn test_unnamed_tracks_share_identity() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        merge_track(track(None, &[3]), &mut aggregate, &mut stats).unwrap();
        let outcome = merge_track(track(None, &[3]), &mut aggregate, &mut stats).unwrap();

        assert_eq!(outcome, Some(TrackOutcome::Duplicate));
        assert_eq!(aggregate.tracks().len(), 1);
    }

    #[test]
    fn test_invalid_track_only_counts_as_empty() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        let trk = Element::new().with("name", "A").with("trkseg", "");
        let outcome = merge_track(Node::from(trk), &mut aggregate, &mut stats).unwrap();

        assert_eq!(outcome, None);
        assert!(aggregate.tracks().is_empty());
        assert_eq!(stats.input_tracks, 1);
        assert_eq!(stats.empty_tracks, 1);
        assert_eq!(stats.valid_tracks, 0);
        assert_eq!(stats.unique_tracks, 0);
    }
}
