/*!
 * upypack - MicroPython package manifest tooling
 *
 * Derives a `mip` compatible package manifest from a declarative package
 * descriptor:
 * - Version from the descriptor or the latest changelog release
 * - Dependencies from `install_requires`
 * - Download URLs for package sources and data files
 * - Validation of an existing manifest with a structural diff on mismatch
 */

pub mod changelog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod logging;
pub mod packager;

// Re-export commonly used types
pub use config::{LogLevel, ToolConfig};
pub use descriptor::{DataFileGroup, PackageDescriptor};
pub use error::{Result, UpyError};
pub use packager::{build_url_entries, rewrite_hosting_url, Packager, PackagerBuilder};
pub use upypack_core_manifest as manifest;
pub use upypack_core_manifest::{ManifestDiff, PackageManifest, UrlEntry, ValidationOptions};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
