//! Run driver: config → discovery → merge → output
//!
//! Files are read one after another in discovery order. Only setup problems
//! (config, output folder, output file) abort the run; anything going wrong with a
//! single input file ends up in the statistics instead.

use crate::cli::Settings;
use crate::config::Config;
use crate::{AppError, Result, metadata, sources};
use chrono::{DateTime, Utc};
use gpx_merge_lib::{Merger, RunStatistics, xml};
use std::path::{Path, PathBuf};

/// Extension of the merged document
pub const OUTPUT_EXTENSION: &str = "gpx";

/// Execute one merge run as described by `settings`
pub async fn run(settings: &Settings) -> Result<RunStatistics> {
    let config = Config::load(&settings.config).await?;
    tracing::info!("Config: {:?}", config);
    let encoding = config.input.encoding()?;

    tokio::fs::create_dir_all(&config.output_folder)
        .await
        .map_err(|source| AppError::OutputDir {
            path: config.output_folder.clone(),
            source,
        })?;

    let entries = sources::discover(&config.input.gpx)?;
    if entries.is_empty() {
        tracing::warn!("No file(s) found for {}", config.input.gpx);
    } else {
        tracing::info!("Merging {} file(s) matching {}", entries.len(), config.input.gpx);
    }

    let mut merger = Merger::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                let file = path.display().to_string();
                tracing::info!("Reading {file}");
                let document = sources::read_document(&path, encoding).await;
                merger.merge_file(&file, document);
            }
            Err(err) => merger.record_failure(&err.path().display().to_string(), err.error()),
        }
    }
    tracing::info!("Completed reading data");

    let (document, stats) = merger.finish(&metadata::creator());
    let bytes = xml::write(&document)?;

    let name = settings.output_file.as_deref().or(config.output_file.as_deref());
    let output_path = config.output_folder.join(output_file_name(name, Utc::now()));
    tokio::fs::write(&output_path, &bytes)
        .await
        .map_err(|source| AppError::Write {
            path: output_path.clone(),
            source,
        })?;
    tracing::info!("Wrote {} ({} bytes)", output_path.display(), bytes.len());

    if settings.verify {
        verify_output(&output_path, &bytes);
    }

    if let Some(stats_path) = &settings.stats_json {
        write_stats(stats_path, &stats).await?;
    }

    tracing::info!("Run summary:\n{stats}");
    Ok(stats)
}

/// Output file name: the configured name (with `.gpx` appended when missing) or a
/// colon-free ISO-8601 UTC timestamp.
pub fn output_file_name(configured: Option<&str>, now: DateTime<Utc>) -> String {
    match configured.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => {
            let has_extension = Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(OUTPUT_EXTENSION));
            if has_extension {
                name.to_string()
            } else {
                format!("{name}.{OUTPUT_EXTENSION}")
            }
        }
        None => format!("{}.{OUTPUT_EXTENSION}", now.format("%Y-%m-%dT%H%M%S%.3fZ")),
    }
}

/// Re-read the written document with the `gpx` crate. Problems are only logged:
/// the merged file is already on disk and keeps the sources' content verbatim.
fn verify_output(path: &Path, bytes: &[u8]) {
    match gpx::read(bytes) {
        Ok(parsed) => tracing::info!(
            "Verified {}: {} waypoints, {} tracks",
            path.display(),
            parsed.waypoints.len(),
            parsed.tracks.len()
        ),
        Err(err) => tracing::warn!("{} did not pass GPX verification: {err}", path.display()),
    }
}

async fn write_stats(path: &Path, stats: &RunStatistics) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| AppError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    tracing::info!("Wrote statistics to {}", path.display());
    Ok(())
}
