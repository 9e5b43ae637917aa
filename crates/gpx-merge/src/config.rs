//! Run configuration
//!
//! The configuration is a JSON file that may start with a UTF-8 byte order mark and
//! may contain `//` line comments:
//!
//! ```json
//! {
//!   // all recordings from every device
//!   "input": { "gpx": "tracks/**/*.gpx", "encoding": "utf8" },
//!   "outputFolder": "merged",
//!   "outputFile": "all-tracks"
//! }
//! ```
//!
//! Relative paths are taken relative to the directory holding the config file.

use crate::{AppError, Result};
use encoding_rs::Encoding;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub input: InputConfig,
    /// Folder the merged document is written to (created if missing)
    pub output_folder: PathBuf,
    /// Output file name; a timestamp is used when absent
    #[serde(default)]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Glob pattern selecting the input files
    pub gpx: String,
    /// Text encoding label of the input files
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "utf8".to_string()
}

impl Config {
    /// Read, clean and parse a config file, resolving relative paths against its folder.
    pub async fn load(path: &Path) -> Result<Self> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AppError::ConfigRead {
                path: path.to_path_buf(),
                source,
            })?;
        let config = Self::parse(&text)?;
        let base = path.parent().unwrap_or(Path::new(""));
        Ok(config.resolve_relative_to(base))
    }

    /// Parse config text (BOM and `//` comments allowed)
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        serde_json::from_str(&strip_line_comments(text)).map_err(AppError::ConfigParse)
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        if Path::new(&self.input.gpx).is_relative() {
            self.input.gpx = base.join(&self.input.gpx).to_string_lossy().into_owned();
        }
        if self.output_folder.is_relative() {
            self.output_folder = base.join(&self.output_folder);
        }
        self
    }
}

impl InputConfig {
    /// Resolve the encoding label.
    ///
    /// Accepts WHATWG labels (`utf-8`, `latin1`, `windows-1252`, ...) as well as the
    /// spellings `utf8`, `utf16le` and `ucs2`.
    pub fn encoding(&self) -> Result<&'static Encoding> {
        let label = match self.encoding.trim().to_ascii_lowercase().as_str() {
            "utf16le" | "ucs2" | "ucs-2" => "utf-16le".to_string(),
            other => other.to_string(),
        };
        Encoding::for_label(label.as_bytes()).ok_or_else(|| AppError::Encoding(self.encoding.clone()))
    }
}

/// Remove `//` comments up to the end of their line, leaving string literals alone
/// (so `"http://..."` survives).
pub fn strip_line_comments(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = chars.next() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '/' if chars.peek() == Some(&'/') => {
                // Drop the comment, keep the newline
                while chars.peek().is_some_and(|&next| next != '\n') {
                    chars.next();
                }
            }
            _ => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::parse(
            r#"{
                "input": { "gpx": "in/*.gpx", "encoding": "latin1" },
                "outputFolder": "out",
                "outputFile": "merged"
            }"#,
        )
        .unwrap();
        assert_eq!(config.input.gpx, "in/*.gpx");
        assert_eq!(config.output_folder, PathBuf::from("out"));
        assert_eq!(config.output_file.as_deref(), Some("merged"));
        assert_eq!(config.input.encoding().unwrap(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse(r#"{ "input": { "gpx": "*.gpx" }, "outputFolder": "out" }"#).unwrap();
        assert_eq!(config.input.encoding, "utf8");
        assert_eq!(config.input.encoding().unwrap(), encoding_rs::UTF_8);
        assert!(config.output_file.is_none());
    }

    #[test]
    fn test_parse_bom_and_comments() {
        let text = "\u{feff}{\n  // where the tracks live\n  \"input\": { \"gpx\": \"*.gpx\" }, // trailing\n  \"outputFolder\": \"out\"\n}\n// end";
        let config = Config::parse(text).unwrap();
        assert_eq!(config.input.gpx, "*.gpx");
    }

    #[test]
    fn test_comments_inside_strings_are_kept() {
        let stripped = strip_line_comments(r#"{"url": "http://example.com/a\"//b"} // gone"#);
        assert_eq!(stripped, r#"{"url": "http://example.com/a\"//b"} "#);
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = Config::parse("{ input: nope }").unwrap_err();
        assert!(matches!(err, AppError::ConfigParse(_)));
    }

    #[test]
    fn test_missing_required_field() {
        assert!(Config::parse(r#"{ "input": { "gpx": "*.gpx" } }"#).is_err());
    }

    #[test]
    fn test_encoding_aliases() {
        let mut input = InputConfig {
            gpx: String::new(),
            encoding: "utf16le".to_string(),
        };
        assert_eq!(input.encoding().unwrap(), encoding_rs::UTF_16LE);

        input.encoding = "UTF-8".to_string();
        assert_eq!(input.encoding().unwrap(), encoding_rs::UTF_8);

        input.encoding = "klingon".to_string();
        assert!(matches!(input.encoding(), Err(AppError::Encoding(label)) if label == "klingon"));
    }

    #[test]
    fn test_resolve_relative_paths() {
        let config = Config::parse(r#"{ "input": { "gpx": "in/*.gpx" }, "outputFolder": "out" }"#)
            .unwrap()
            .resolve_relative_to(Path::new("/data/project"));
        assert_eq!(config.input.gpx, "/data/project/in/*.gpx");
        assert_eq!(config.output_folder, PathBuf::from("/data/project/out"));
    }

    #[test]
    fn test_absolute_paths_untouched() {
        let config = Config::parse(r#"{ "input": { "gpx": "/tracks/*.gpx" }, "outputFolder": "/out" }"#)
            .unwrap()
            .resolve_relative_to(Path::new("/data/project"));
        assert_eq!(config.input.gpx, "/tracks/*.gpx");
        assert_eq!(config.output_folder, PathBuf::from("/out"));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("merge.json");
        std::fs::write(&path, r#"{ "input": { "gpx": "*.gpx" }, "outputFolder": "out" }"#).unwrap();

        let config = Config::load(&path).await.unwrap();
        assert_eq!(config.output_folder, dir.path().join("out"));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = Config::load(Path::new("/definitely/not/here.json")).await.unwrap_err();
        assert!(matches!(err, AppError::ConfigRead { .. }));
    }
}
