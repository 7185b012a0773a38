/*!
 * Error types for upypack
 */

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::changelog::ChangelogError;

pub type Result<T> = std::result::Result<T, UpyError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_MISMATCH: i32 = 1;
pub const EXIT_FATAL: i32 = 2;

#[derive(Debug)]
pub enum UpyError {
    /// Descriptor has no `url`, so no download URL can be built
    MissingUrl,

    /// A manifest-dependent operation was requested without a manifest path
    NoManifestPath,

    /// Descriptor could not be read or parsed
    Descriptor { path: PathBuf, message: String },

    /// Manifest read, parse or write failure
    Manifest(upypack_core_manifest::Error),

    /// Changelog version extraction failed
    Changelog(ChangelogError),

    /// Configuration error
    Config(String),

    /// I/O error
    Io(io::Error),

    /// Existing manifest differs from the descriptor data
    ValidationMismatch,
}

impl UpyError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            UpyError::ValidationMismatch => EXIT_MISMATCH,
            _ => EXIT_FATAL,
        }
    }

    pub fn descriptor<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        UpyError::Descriptor {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for UpyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpyError::MissingUrl => write!(f, "Project URL is mandatory"),
            UpyError::NoManifestPath => write!(f, "No manifest path specified"),
            UpyError::Descriptor { path, message } => {
                write!(f, "Invalid descriptor {}: {}", path.display(), message)
            }
            UpyError::Manifest(err) => write!(f, "Manifest error: {}", err),
            UpyError::Changelog(err) => write!(f, "Changelog error: {}", err),
            UpyError::Config(msg) => write!(f, "Configuration error: {}", msg),
            UpyError::Io(err) => write!(f, "I/O error: {}", err),
            UpyError::ValidationMismatch => {
                write!(f, "Mismatch between descriptor data and manifest")
            }
        }
    }
}

impl std::error::Error for UpyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UpyError::Manifest(err) => Some(err),
            UpyError::Changelog(err) => Some(err),
            UpyError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for UpyError {
    fn from(err: io::Error) -> Self {
        UpyError::Io(err)
    }
}

impl From<upypack_core_manifest::Error> for UpyError {
    fn from(err: upypack_core_manifest::Error) -> Self {
        UpyError::Manifest(err)
    }
}

impl From<ChangelogError> for UpyError {
    fn from(err: ChangelogError) -> Self {
        UpyError::Changelog(err)
    }
}
