//! GPX Merge Library - Core engine for merging and deduplicating GPX files
//!
//! This library folds any number of parsed GPX documents into one aggregate
//! document, dropping repeated waypoints and tracks and rejecting tracks that have
//! no usable points.
//!
//! # Architecture
//!
//! - **[`Node`]**: Generic document tree produced by the [`xml`] adapter
//! - **[`waypoint`]**: Waypoint identity and deduplication
//! - **[`track`]**: Track validation, identity and conflict handling
//! - **[`AggregateDocument`]**: The growing output document and its point-count ledger
//! - **[`RunStatistics`]**: Counters describing what happened during the run
//! - **[`Merger`]**: Feeds whole documents through the above, isolating per-file failures
//!
//! # Identity rules
//!
//! - Waypoints are equal when `lat`, `lon`, `time` and `name` are textually equal
//!   (absent equals absent). `"1.0"` and `"1"` are different waypoints.
//! - Tracks are equal when their names and point counts are equal. A same-named
//!   track with a different point count is kept as a second entry and logged.

mod aggregate;
mod merger;
mod stats;
pub mod track;
pub mod tree;
pub mod waypoint;
pub mod xml;

// Public API exports
pub use aggregate::{AggregateDocument, GPX_NAMESPACE, GPX_VERSION};
pub use merger::Merger;
pub use stats::{FileFailure, RunStatistics};
pub use track::{TrackOutcome, Validation};
pub use tree::{Element, Node};
pub use waypoint::WaypointKey;

/// Error types for the merge engine
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Unclosed element <{0}> at end of input")]
    UnclosedElement(String),

    #[error("Unexpected closing tag </{0}>")]
    UnexpectedEnd(String),

    #[error("Malformed {section}: {reason}")]
    Malformed {
        section: &'static str,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, MergeError>;
