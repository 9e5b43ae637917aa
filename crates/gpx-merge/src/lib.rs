//! GPX Merge - Application Library
//!
//! Wires the merge engine from `gpx-merge-lib` to the outside world: command line,
//! JSON configuration, input file discovery and decoding, logging, and writing the
//! merged document.

pub mod cli;
pub mod config;
mod metadata;
pub mod profiling;
mod run;
pub mod sources;

pub use cli::Settings;
pub use config::Config;
pub use metadata::{creator, log_version_info, short_version_info};
pub use run::{output_file_name, run};

use gpx_merge_lib::MergeError;
use std::path::PathBuf;

/// Errors that abort a run
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Cannot read config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config file is not valid JSON: {0}")]
    ConfigParse(#[source] serde_json::Error),

    #[error("Unknown text encoding {0:?}")]
    Encoding(String),

    #[error("Invalid input pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        source: glob::PatternError,
    },

    #[error("Cannot create output folder {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Cannot write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Cannot serialize statistics: {0}")]
    Stats(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;
