//! Waypoint identity and deduplication

use crate::aggregate::AggregateDocument;
use crate::stats::RunStatistics;
use crate::tree::Node;
use crate::{MergeError, Result};

/// Identity of a waypoint: `lat`, `lon`, `time` and `name` as written in the source.
///
/// Values are compared as opaque text, so `"10.0"` and `"10.00"` are different
/// coordinates. A field missing on both sides compares equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WaypointKey {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub time: Option<String>,
    pub name: Option<String>,
}

impl WaypointKey {
    /// Read the identity fields of a `wpt` node.
    ///
    /// Blank nodes (`<wpt/>`) have no fields at all; any other non-element node is
    /// rejected as malformed.
    pub fn from_node(waypoint: &Node) -> Result<Self> {
        match waypoint {
            Node::Element(element) => Ok(Self {
                latitude: element.attribute("lat").map(str::to_string),
                longitude: element.attribute("lon").map(str::to_string),
                time: element.text("time").map(str::to_string),
                name: element.text("name").map(str::to_string),
            }),
            node if node.is_blank() => Ok(Self {
                latitude: None,
                longitude: None,
                time: None,
                name: None,
            }),
            Node::Text(text) => Err(MergeError::Malformed {
                section: "waypoint",
                reason: format!("unexpected text content {text:?}"),
            }),
            Node::List(_) => Err(MergeError::Malformed {
                section: "waypoint",
                reason: "nested waypoint list".to_string(),
            }),
        }
    }
}

/// Offer a waypoint to the aggregate.
///
/// Returns `true` when the waypoint was new and appended, `false` when an equal
/// waypoint was already kept. Malformed nodes are returned as errors before any
/// counter moves.
pub fn consider(
    waypoint: Node,
    aggregate: &mut AggregateDocument,
    stats: &mut RunStatistics,
) -> Result<bool> {
    let key = WaypointKey::from_node(&waypoint)?;
    stats.input_waypoints += 1;

    if aggregate.contains_waypoint(&key) {
        tracing::trace!("Duplicate waypoint {:?}", key);
        stats.duplicate_waypoints += 1;
        return Ok(false);
    }

    aggregate.push_waypoint(key, waypoint);
    stats.unique_waypoints += 1;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Element;

    fn waypoint(lat: &str, lon: &str, time: Option<&str>, name: Option<&str>) -> Node {
        let mut element = Element::new()
            .with_attribute("lat", lat)
            .with_attribute("lon", lon);
        if let Some(time) = time {
            element.insert("time", time);
        }
        if let Some(name) = name {
            element.insert("name", name);
        }
        Node::from(element)
    }

    #[test]
    fn test_identical_waypoint_is_duplicate() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();
        let wpt = waypoint("1.0", "2.0", Some("2020-01-01T00:00:00Z"), Some("W"));

        assert!(consider(wpt.clone(), &mut aggregate, &mut stats).unwrap());
        assert!(!consider(wpt, &mut aggregate, &mut stats).unwrap());

        assert_eq!(aggregate.waypoints().len(), 1);
        assert_eq!(stats.input_waypoints, 2);
        assert_eq!(stats.unique_waypoints, 1);
        assert_eq!(stats.duplicate_waypoints, 1);
    }

    #[test]
    fn test_coordinates_compare_as_text() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        consider(waypoint("10.0", "2", None, None), &mut aggregate, &mut stats).unwrap();
        consider(waypoint("10.00", "2", None, None), &mut aggregate, &mut stats).unwrap();

        assert_eq!(aggregate.waypoints().len(), 2);
        assert_eq!(stats.duplicate_waypoints, 0);
    }

    #[test]
    fn test_missing_fields() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        // Absent name on both sides: equal
        consider(waypoint("1", "2", Some("t"), None), &mut aggregate, &mut stats).unwrap();
        assert!(!consider(waypoint("1", "2", Some("t"), None), &mut aggregate, &mut stats).unwrap());

        // Present vs absent: different
        assert!(consider(waypoint("1", "2", Some("t"), Some("")), &mut aggregate, &mut stats).unwrap());
        assert!(consider(waypoint("1", "2", None, None), &mut aggregate, &mut stats).unwrap());

        assert_eq!(stats.unique_waypoints, 3);
        assert_eq!(stats.duplicate_waypoints, 1);
    }

    #[test]
    fn test_first_seen_is_kept_verbatim() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        let first = Node::from(
            Element::new()
                .with_attribute("lat", "1")
                .with_attribute("lon", "2")
                .with("ele", "100"),
        );
        let second = Node::from(
            Element::new()
                .with_attribute("lat", "1")
                .with_attribute("lon", "2")
                .with("ele", "250"),
        );

        consider(first.clone(), &mut aggregate, &mut stats).unwrap();
        consider(second, &mut aggregate, &mut stats).unwrap();

        assert_eq!(aggregate.waypoints(), &[first]);
    }

    #[test]
    fn test_blank_waypoint_has_empty_key() {
        let key = WaypointKey::from_node(&Node::from("")).unwrap();
        assert!(key.latitude.is_none() && key.name.is_none());
    }

    #[test]
    fn test_malformed_waypoint_moves_no_counter() {
        let mut aggregate = AggregateDocument::new();
        let mut stats = RunStatistics::default();

        let result = consider(Node::from("junk"), &mut aggregate, &mut stats);
        assert!(matches!(result, Err(MergeError::Malformed { section: "waypoint", .. })));
        assert_eq!(stats.input_waypoints, 0);
        assert!(aggregate.waypoints().is_empty());
    }
}
