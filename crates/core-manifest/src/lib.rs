//! Core manifest data structures for upypack
//!
//! This crate models the MicroPython package manifest (`package.json` as read by
//! `mip`) and provides the comparison primitives used to validate an existing
//! manifest against freshly derived data.
//!
//! # Key Concepts
//!
//! - **Package Manifest**: `{ "urls": [[path, url], ...], "deps": [...], "version": "x.y.z" }`
//! - **Url Entry**: a `[relative_path, download_url]` pair
//! - **Manifest Diff**: path-addressed list of added, removed and changed values
//!
//! # Example
//!
//! ```no_run
//! use upypack_core_manifest::{compare_documents, PackageManifest, UrlEntry, ValidationOptions};
//!
//! let manifest = PackageManifest::new(
//!     "1.2.3",
//!     vec!["dependency_1".to_string()],
//!     vec![UrlEntry::new("lib/core.py", "github:owner/repo/lib/core.py")],
//! );
//! let existing = upypack_core_manifest::load_document("package.json").unwrap();
//! let derived = manifest.to_value().unwrap();
//! let equal = compare_documents(&derived, &existing, &ValidationOptions::default());
//! ```

pub mod diff;
pub mod error;
pub mod package;
pub mod validate;

// Re-export main types for convenience
pub use diff::{diff_documents, ChangeKind, DiffEntry, ManifestDiff};
pub use error::{Error, Result};
pub use package::{load_document, render_json, PackageManifest, UrlEntry};
pub use validate::{compare_documents, normalize_document, ValidationOptions};

/// Version reported when no real version can be determined
pub const SENTINEL_VERSION: &str = "-1.-1.-1";

/// Top-level keys of a manifest document
pub const KEY_URLS: &str = "urls";
pub const KEY_DEPS: &str = "deps";
pub const KEY_VERSION: &str = "version";
