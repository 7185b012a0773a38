/*!
 * Version extraction from a "Keep a Changelog" style document
 *
 * The latest release is the first `## [x.y.z] - date` heading; the
 * `## [Unreleased]` section is skipped.
 */

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors that can occur while extracting a changelog version
#[derive(Error, Debug)]
pub enum ChangelogError {
    #[error("Failed to read changelog '{path}': {source}")]
    FileReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("No release heading found in changelog '{path}'")]
    NoRelease { path: PathBuf },

    #[error("No semantic version in release line '{line}'")]
    InvalidVersion { line: String },
}

fn release_heading() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^##\s*\[\d+\.\d+\.\d+[^\]]*\]").expect("release heading regex is valid")
    })
}

fn semver() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r"(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)",
            r"(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
            r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?",
        ))
        .expect("semver regex is valid")
    })
}

/// Extracts release versions from changelog files
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangelogParser;

impl ChangelogParser {
    pub fn new() -> Self {
        ChangelogParser
    }

    /// Return the heading line of the latest release
    pub fn latest_release_line(&self, path: &Path) -> Result<String, ChangelogError> {
        let contents =
            std::fs::read_to_string(path).map_err(|source| ChangelogError::FileReadError {
                path: path.to_path_buf(),
                source,
            })?;

        self.latest_release_in(&contents)
            .map(str::to_string)
            .ok_or_else(|| ChangelogError::NoRelease {
                path: path.to_path_buf(),
            })
    }

    /// Find the latest release heading in changelog text
    pub fn latest_release_in<'a>(&self, contents: &'a str) -> Option<&'a str> {
        contents
            .lines()
            .map(str::trim_end)
            .find(|line| release_heading().is_match(line))
    }

    /// Extract the semantic version from a release heading
    pub fn parse_semver_line(&self, line: &str) -> Result<String, ChangelogError> {
        semver()
            .find(line)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ChangelogError::InvalidVersion {
                line: line.to_string(),
            })
    }

    /// Latest released version of a changelog file
    pub fn extract_version(&self, path: &Path) -> Result<String, ChangelogError> {
        let line = self.latest_release_line(path)?;
        tracing::debug!("Latest release line: {}", line);
        self.parse_semver_line(&line)
    }
}
