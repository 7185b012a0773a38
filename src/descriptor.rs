/*!
 * Package descriptor loading
 *
 * A descriptor is the declarative counterpart of a `setup.py` call: a TOML
 * (or JSON, by `.json` extension) document with the package name, version,
 * project URL, package directories, data file groups and dependencies.
 *
 * ```toml
 * name = "micropython-example"
 * version = "1.2.3"
 * url = "https://github.com/owner/micropython-example"
 * packages = ["example"]
 * install_requires = ["logging"]
 *
 * [[data_files]]
 * group = "static"
 * files = ["static/style.css"]
 *
 * [metadata]
 * version = "1.2.4"   # overrides the top-level value
 * ```
 */

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{Result, UpyError};
use upypack_core_manifest::SENTINEL_VERSION;

/// Declared package metadata, every field optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: Option<String>,

    pub version: Option<String>,

    /// Project URL, the base of every download URL
    pub url: Option<String>,

    /// Package directories, relative to the descriptor
    pub packages: Option<Vec<String>>,

    /// Additional files grouped by install target
    pub data_files: Option<Vec<DataFileGroup>>,

    /// Dependency identifiers
    pub install_requires: Option<Vec<String>>,

    /// Nested metadata, merged over the top-level fields on load
    #[serde(default, skip_serializing)]
    pub metadata: Option<Box<PackageDescriptor>>,
}

/// A named group of data files
///
/// Accepted as `{ group = "static", files = [...] }` or as the pair
/// `["static", [...]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "DataFileGroupRepr")]
pub struct DataFileGroup {
    pub group: String,
    pub files: Vec<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DataFileGroupRepr {
    Table { group: String, files: Vec<String> },
    Pair(String, Vec<String>),
}

impl From<DataFileGroupRepr> for DataFileGroup {
    fn from(repr: DataFileGroupRepr) -> Self {
        match repr {
            DataFileGroupRepr::Table { group, files } | DataFileGroupRepr::Pair(group, files) => {
                DataFileGroup { group, files }
            }
        }
    }
}

impl DataFileGroup {
    pub fn new<S: Into<String>>(group: S, files: Vec<String>) -> Self {
        Self {
            group: group.into(),
            files,
        }
    }
}

impl PackageDescriptor {
    /// Load a descriptor file and merge its nested metadata
    pub fn load(path: &Path) -> Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| UpyError::descriptor(path, e.to_string()))?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let parsed = if is_json {
            Self::from_json_str(&contents)
        } else {
            Self::from_toml_str(&contents)
        };
        let mut descriptor = parsed.map_err(|message| UpyError::descriptor(path, message))?;

        descriptor.merge_metadata();
        debug!(
            "Loaded descriptor {} ({})",
            path.display(),
            descriptor.name.as_deref().unwrap_or("unnamed")
        );

        Ok(descriptor)
    }

    fn from_toml_str(contents: &str) -> std::result::Result<Self, String> {
        toml::from_str(contents).map_err(|e| e.to_string())
    }

    fn from_json_str(contents: &str) -> std::result::Result<Self, String> {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    }

    /// Overwrite top-level fields with those set in `metadata`
    pub fn merge_metadata(&mut self) {
        let Some(metadata) = self.metadata.take() else {
            return;
        };
        let PackageDescriptor {
            name,
            version,
            url,
            packages,
            data_files,
            install_requires,
            metadata: _,
        } = *metadata;

        if name.is_some() {
            self.name = name;
        }
        if version.is_some() {
            self.version = version;
        }
        if url.is_some() {
            self.url = url;
        }
        if packages.is_some() {
            self.packages = packages;
        }
        if data_files.is_some() {
            self.data_files = data_files;
        }
        if install_requires.is_some() {
            self.install_requires = install_requires;
        }
    }

    /// Declared version, or the sentinel version
    pub fn version(&self) -> String {
        match self.version.as_deref() {
            Some(version) if !version.is_empty() => version.to_string(),
            _ => {
                warn!("No 'version' key found in descriptor");
                SENTINEL_VERSION.to_string()
            }
        }
    }

    /// Declared dependencies, or none
    pub fn install_requires(&self) -> Vec<String> {
        match self.install_requires.as_deref() {
            Some(deps) if !deps.is_empty() => deps.to_vec(),
            _ => {
                warn!("No 'install_requires' key found in descriptor");
                Vec::new()
            }
        }
    }

    /// Declared project URL; a manifest cannot be built without it
    pub fn url(&self) -> Result<&str> {
        match self.url.as_deref() {
            Some(url) if !url.is_empty() => Ok(url),
            _ => {
                warn!("No 'url' key found in descriptor");
                Err(UpyError::MissingUrl)
            }
        }
    }

    /// Declared package directories, or none
    pub fn packages(&self) -> &[String] {
        match self.packages.as_deref() {
            Some(packages) if !packages.is_empty() => packages,
            _ => {
                warn!("No 'packages' key found in descriptor");
                &[]
            }
        }
    }

    /// Declared data file groups, or none
    pub fn data_files(&self) -> &[DataFileGroup] {
        match self.data_files.as_deref() {
            Some(groups) if !groups.is_empty() => groups,
            _ => {
                warn!("No 'data_files' key found in descriptor");
                &[]
            }
        }
    }
}
