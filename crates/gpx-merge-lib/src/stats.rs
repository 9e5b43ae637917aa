//! Run statistics
//!
//! Counters only ever grow during a run. The orchestrator is the only writer; the
//! CLI reads a snapshot once the pass is over and prints it as the run summary.

use std::fmt;

/// A per-file error that was caught and did not stop the run
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileFailure {
    /// Input file the error belongs to
    pub file: String,
    /// Human readable error message
    pub message: String,
}

/// Counters summarizing one merge run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStatistics {
    /// Input files handed to the merger, readable or not
    pub files_read: usize,
    /// Caught per-file errors, in the order they happened
    pub failures: Vec<FileFailure>,
    /// Files that parsed but had no `gpx` root
    pub not_gpx: usize,
    pub input_tracks: usize,
    pub valid_tracks: usize,
    /// Tracks rejected because a segment had no points (or there were no segments)
    pub empty_tracks: usize,
    pub duplicate_tracks: usize,
    /// Tracks kept although a same-named track with a different point count exists
    pub conflicting_tracks: usize,
    pub unique_tracks: usize,
    /// Sum of track points over all kept tracks
    pub unique_track_points: usize,
    pub input_waypoints: usize,
    pub duplicate_waypoints: usize,
    pub unique_waypoints: usize,
}

impl RunStatistics {
    /// Number of caught failures
    #[inline]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// At least one input file was handled and nothing failed
    pub fn succeeded(&self) -> bool {
        self.files_read > 0 && self.failures.is_empty()
    }

    pub(crate) fn record_failure(&mut self, file: &str, message: impl Into<String>) {
        self.failures.push(FileFailure {
            file: file.to_string(),
            message: message.into(),
        });
    }
}

impl fmt::Display for RunStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "files read:          {}", self.files_read)?;
        writeln!(f, "failures:            {}", self.failure_count())?;
        for failure in &self.failures {
            writeln!(f, "  {}: {}", failure.file, failure.message)?;
        }
        writeln!(f, "not GPX:             {}", self.not_gpx)?;
        writeln!(f, "input tracks:        {}", self.input_tracks)?;
        writeln!(f, "valid tracks:        {}", self.valid_tracks)?;
        writeln!(f, "empty tracks:        {}", self.empty_tracks)?;
        writeln!(f, "duplicate tracks:    {}", self.duplicate_tracks)?;
        writeln!(f, "conflicting tracks:  {}", self.conflicting_tracks)?;
        writeln!(f, "unique tracks:       {}", self.unique_tracks)?;
        writeln!(f, "unique track points: {}", self.unique_track_points)?;
        writeln!(f, "input waypoints:     {}", self.input_waypoints)?;
        writeln!(f, "duplicate waypoints: {}", self.duplicate_waypoints)?;
        write!(f, "unique waypoints:    {}", self.unique_waypoints)
    }
}
