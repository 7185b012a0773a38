/*!
 * MicroPython package manifest creation and validation
 *
 * A `Packager` owns one loaded descriptor and derives the manifest from it on
 * every call, so repeated calls observe filesystem changes in between.
 */

use glob::MatchOptions;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn, Dispatch};

use crate::changelog::ChangelogParser;
use crate::config::{ToolConfig, DEFAULT_MANIFEST_FILE_NAME, DEFAULT_SOURCE_PATTERN};
use crate::descriptor::PackageDescriptor;
use crate::error::{Result, UpyError};
use upypack_core_manifest::{
    compare_documents, diff_documents, load_document, ManifestDiff, PackageManifest, UrlEntry,
    ValidationOptions, SENTINEL_VERSION,
};

/// Web URL prefix of GitHub projects
pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

/// Short alias `mip` resolves to GitHub
pub const GITHUB_ALIAS_PREFIX: &str = "github:";

/// Replace the GitHub web URL prefix with the `github:` alias
///
/// Only an exact prefix match is rewritten; any other URL is returned as is.
pub fn rewrite_hosting_url(url: &str) -> String {
    match url.strip_prefix(GITHUB_URL_PREFIX) {
        Some(rest) => format!("{}{}", GITHUB_ALIAS_PREFIX, rest),
        None => url.to_string(),
    }
}

/// Build one `[path, base_url/path]` entry per file, in input order
///
/// The URL is a plain concatenation with a single `/`; `..` segments are kept.
pub fn build_url_entries<P: AsRef<Path>>(files: &[P], base_url: &str) -> Vec<UrlEntry> {
    let base = base_url.trim_end_matches('/');
    files
        .iter()
        .map(|file| {
            let path = url_path(file.as_ref());
            let url = format!("{}/{}", base, path);
            debug!("File elements: {}: {}", path, url);
            UrlEntry::new(path, url)
        })
        .collect()
}

// Relative path rendered with `/` regardless of platform
fn url_path(path: &Path) -> String {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Builder for [`Packager`]
#[derive(Debug, Clone)]
pub struct PackagerBuilder {
    descriptor_path: PathBuf,
    manifest_path: Option<PathBuf>,
    changelog_path: Option<PathBuf>,
    source_pattern: String,
    manifest_file_name: String,
    dispatch: Option<Dispatch>,
}

impl PackagerBuilder {
    /// Existing manifest to validate against, and default `create` target
    pub fn manifest_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.manifest_path = path.map(Into::into);
        self
    }

    /// Changelog whose latest release provides the version
    pub fn changelog_path<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.changelog_path = path.map(Into::into);
        self
    }

    pub fn config(mut self, config: &ToolConfig) -> Self {
        self.source_pattern = config.source_pattern.clone();
        self.manifest_file_name = config.manifest_file_name.clone();
        self
    }

    /// Route all diagnostics of the packager to `dispatch`
    pub fn dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Load the descriptor and build the packager
    pub fn build(self) -> Result<Packager> {
        // Glob results carry no `./` prefix, so the root must be absolute
        let descriptor_path = std::fs::canonicalize(&self.descriptor_path)
            .map_err(|e| UpyError::descriptor(&self.descriptor_path, e.to_string()))?;

        let load = || PackageDescriptor::load(&descriptor_path);
        let descriptor = match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, load)?,
            None => load()?,
        };

        let root_dir = match descriptor_path.parent() {
            Some(parent) => parent.to_path_buf(),
            None => PathBuf::from("/"),
        };

        Ok(Packager {
            descriptor_path,
            root_dir,
            manifest_path: self.manifest_path,
            changelog_path: self.changelog_path,
            source_pattern: self.source_pattern,
            manifest_file_name: self.manifest_file_name,
            dispatch: self.dispatch,
            descriptor,
        })
    }
}

/// Creates and validates the manifest of one descriptor
#[derive(Debug)]
pub struct Packager {
    descriptor_path: PathBuf,
    root_dir: PathBuf,
    manifest_path: Option<PathBuf>,
    changelog_path: Option<PathBuf>,
    source_pattern: String,
    manifest_file_name: String,
    dispatch: Option<Dispatch>,
    descriptor: PackageDescriptor,
}

impl Packager {
    pub fn builder<P: Into<PathBuf>>(descriptor_path: P) -> PackagerBuilder {
        PackagerBuilder {
            descriptor_path: descriptor_path.into(),
            manifest_path: None,
            changelog_path: None,
            source_pattern: DEFAULT_SOURCE_PATTERN.to_string(),
            manifest_file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            dispatch: None,
        }
    }

    /// Packager with defaults and no manifest or changelog
    pub fn new<P: Into<PathBuf>>(descriptor_path: P) -> Result<Self> {
        Self::builder(descriptor_path).build()
    }

    fn scoped<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }

    pub fn descriptor_mut(&mut self) -> &mut PackageDescriptor {
        &mut self.descriptor
    }

    /// Absolute descriptor path
    pub fn descriptor_path(&self) -> &Path {
        &self.descriptor_path
    }

    /// Directory all package paths are relative to
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn manifest_path(&self) -> Option<&Path> {
        self.manifest_path.as_deref()
    }

    /// Version declared in the descriptor
    pub fn package_version(&self) -> String {
        self.scoped(|| self.descriptor.version())
    }

    /// Version of the latest changelog release
    pub fn changelog_version(&self) -> Result<String> {
        self.scoped(|| -> Result<String> {
            match &self.changelog_path {
                Some(path) => Ok(ChangelogParser::new().extract_version(path)?),
                None => {
                    warn!("No package changelog file specified");
                    Ok(SENTINEL_VERSION.to_string())
                }
            }
        })
    }

    pub fn package_deps(&self) -> Vec<String> {
        self.scoped(|| self.descriptor.install_requires())
    }

    pub fn package_url(&self) -> Result<String> {
        self.scoped(|| self.descriptor.url().map(str::to_string))
    }

    /// Source files directly inside each package directory, relative to the root
    ///
    /// Subdirectories of a package directory are not descended into.
    pub fn package_files(&self) -> Vec<PathBuf> {
        self.scoped(|| {
            let options = MatchOptions {
                require_literal_leading_dot: true,
                ..MatchOptions::new()
            };
            let root = glob::Pattern::escape(&self.root_dir.to_string_lossy());
            let mut all_files = Vec::new();

            for package in self.descriptor.packages() {
                let pattern = PathBuf::from(&root)
                    .join(glob::Pattern::escape(package))
                    .join(&self.source_pattern);
                let pattern = pattern.to_string_lossy();

                let paths = match glob::glob_with(&pattern, options) {
                    Ok(paths) => paths,
                    Err(e) => {
                        warn!("Invalid package file pattern '{}': {}", pattern, e);
                        continue;
                    }
                };

                all_files.extend(
                    paths
                        .filter_map(|entry| entry.ok())
                        .filter(|path| path.is_file())
                        .filter_map(|path| self.relative_to_root(&path)),
                );
            }

            all_files
        })
    }

    /// Declared data files that exist, relative to the root
    pub fn data_files(&self) -> Vec<PathBuf> {
        self.scoped(|| {
            let mut all_files = Vec::new();

            for group in self.descriptor.data_files() {
                for file in &group.files {
                    let path = self.root_dir.join(file);
                    if !path.is_file() {
                        debug!("Skipping missing data file {} ({})", file, group.group);
                        continue;
                    }
                    if let Some(relative) = self.relative_to_root(&path) {
                        all_files.push(relative);
                    }
                }
            }

            all_files
        })
    }

    fn relative_to_root(&self, path: &Path) -> Option<PathBuf> {
        path.strip_prefix(&self.root_dir)
            .map(Path::to_path_buf)
            .map_err(|_| warn!("{} is outside of {}", path.display(), self.root_dir.display()))
            .ok()
    }

    /// Derive the manifest from the descriptor and the files on disk
    pub fn package_data(&self) -> Result<PackageManifest> {
        let version = if self.changelog_path.is_some() {
            self.changelog_version()?
        } else {
            self.package_version()
        };
        let url = rewrite_hosting_url(&self.package_url()?);
        let deps = self.package_deps();
        let package_files = self.package_files();
        let data_files = self.data_files();

        self.scoped(|| {
            let mut urls = build_url_entries(&package_files, &url);
            urls.extend(build_url_entries(&data_files, &url));

            debug!("version: {}", version);
            debug!("install_requires: {:?}", deps);
            debug!("package_files: {:?}", package_files);
            debug!("data_files: {:?}", data_files);
            debug!("url: {}", url);

            Ok(PackageManifest::new(version, deps, urls))
        })
    }

    /// Read the existing manifest, fresh on every call
    pub fn existing_manifest(&self) -> Result<serde_json::Value> {
        let path = self.manifest_path.as_ref().ok_or(UpyError::NoManifestPath)?;
        Ok(load_document(path)?)
    }

    /// Compare the existing manifest with the derived one
    pub fn validate(&self, options: &ValidationOptions) -> Result<bool> {
        let existing = self.existing_manifest()?;
        let derived = self.package_data()?.to_value()?;

        let equal = compare_documents(&derived, &existing, options);
        self.scoped(|| debug!("Validation with {:?}: {}", options, equal));
        Ok(equal)
    }

    /// Every difference between the derived and the existing manifest
    ///
    /// Always compares full documents; validation exclusions do not apply.
    pub fn validation_diff(&self) -> Result<ManifestDiff> {
        let derived = self.package_data()?.to_value()?;
        let existing = self.existing_manifest()?;
        Ok(diff_documents(&derived, &existing))
    }

    /// Path `create` writes to when no explicit output path is given
    pub fn default_output_path(&self) -> PathBuf {
        match &self.manifest_path {
            Some(path) => path.clone(),
            None => {
                self.scoped(|| {
                    info!("No manifest path specified, using descriptor directory")
                });
                self.root_dir.join(&self.manifest_file_name)
            }
        }
    }

    /// Write the derived manifest, replacing the target file
    pub fn create(&self, output_path: Option<&Path>, pretty: bool) -> Result<PathBuf> {
        let output_path = match output_path {
            Some(path) => path.to_path_buf(),
            None => self.default_output_path(),
        };

        let manifest = self.package_data()?;
        manifest.save(&output_path, pretty)?;

        self.scoped(|| debug!("Created {}", output_path.display()));
        Ok(output_path)
    }
}
