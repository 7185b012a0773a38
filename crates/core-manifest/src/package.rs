//! Package Manifest data structures and JSON I/O
//!
//! A Package Manifest lists every file of a MicroPython package together with
//! the URL `mip` downloads it from, the package dependencies and its version.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io;
use std::path::Path;

/// Package Manifest: the document consumed by `mip`
///
/// Field order matches the layout `mip` tooling writes (`urls`, `deps`, `version`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackageManifest {
    /// Files of the package as `[relative_path, url]` pairs
    pub urls: Vec<UrlEntry>,

    /// Dependency identifiers, installed before the package itself
    pub deps: Vec<String>,

    /// Package version (semantic version or the sentinel `-1.-1.-1`)
    pub version: String,
}

/// A single `[relative_path, url]` pair, serialized as a two-element JSON array
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlEntry(pub String, pub String);

impl UrlEntry {
    pub fn new<P: Into<String>, U: Into<String>>(path: P, url: U) -> Self {
        UrlEntry(path.into(), url.into())
    }

    /// Path of the file relative to the package root
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Download URL of the file
    pub fn url(&self) -> &str {
        &self.1
    }
}

impl PackageManifest {
    /// Create a new Package Manifest
    pub fn new<S: Into<String>>(version: S, deps: Vec<String>, urls: Vec<UrlEntry>) -> Self {
        Self {
            urls,
            deps,
            version: version.into(),
        }
    }

    /// Convert to a JSON value
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Render as JSON, 4-space indented if `pretty`, otherwise compact
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        render_json(self, pretty)
    }

    /// Save Package Manifest to a JSON file, replacing any previous content
    pub fn save<P: AsRef<Path>>(&self, path: P, pretty: bool) -> Result<()> {
        let json = self.to_json(pretty)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load Package Manifest from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::manifest_not_found(path));
        }

        let contents = std::fs::read_to_string(path)?;
        let manifest: PackageManifest = serde_json::from_str(&contents)?;
        Ok(manifest)
    }
}

/// Load a manifest file as a raw JSON document
///
/// Unknown keys are preserved so they take part in structural comparison.
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<Value> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::manifest_not_found(path));
    }

    let contents = std::fs::read_to_string(path)?;
    let document: Value = serde_json::from_str(&contents)?;
    if !document.is_object() {
        return Err(Error::not_an_object(path));
    }

    Ok(document)
}

/// Serialize any value as JSON, 4-space indented if `pretty`, otherwise compact
pub fn render_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if !pretty {
        return Ok(serde_json::to_string(value)?);
    }

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    String::from_utf8(buf).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}
