//! Input file discovery and decoding

use crate::{AppError, Result};
use encoding_rs::Encoding;
use gpx_merge_lib::{Node, xml};
use std::path::{Path, PathBuf};

/// Expand the input pattern into files, in the glob crate's (alphabetical) order.
///
/// Directories are skipped. Entries that could not be read while walking are kept
/// as errors so the caller can report them per file.
pub fn discover(pattern: &str) -> Result<Vec<std::result::Result<PathBuf, glob::GlobError>>> {
    let entries = glob::glob(pattern).map_err(|source| AppError::Pattern {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(entries
        .filter(|entry| match entry {
            Ok(path) => path.is_file(),
            Err(_) => true,
        })
        .collect())
}

/// Read one input file, decode it and parse it into a document tree.
///
/// A byte order mark overrides `encoding`. Undecodable byte sequences are replaced
/// and reported as a warning rather than failing the file.
pub async fn read_document(path: &Path, encoding: &'static Encoding) -> Result<Node> {
    let bytes = tokio::fs::read(path).await.map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!("{}: {} bytes", path.display(), bytes.len());

    let (text, used, had_errors) = encoding.decode(&bytes);
    if had_errors {
        tracing::warn!(
            "{}: replaced byte sequences that are not valid {}",
            path.display(),
            used.name()
        );
    }

    Ok(xml::parse(&text)?)
}
