//! Error types for abundance table loading.

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a source table could not be loaded.
///
/// Every variant is terminal for a pipeline run: nothing downstream of the
/// loader executes once one of these is returned.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Source file does not exist.
    #[error("input file not found: {path}")]
    NotFound { path: PathBuf },

    /// Source file has no header or no data rows.
    #[error("input file is empty: {path}")]
    Empty { path: PathBuf },

    /// Source file could not be parsed into a table.
    #[error("could not parse {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    /// Any other failure while reading the source.
    #[error("unexpected error while loading {path}: {message}")]
    Unknown { path: PathBuf, message: String },
}

impl LoadError {
    /// Short, stable name of the failure kind (used in logs and run reports).
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Empty { .. } => "empty",
            Self::Malformed { .. } => "malformed",
            Self::Unknown { .. } => "unknown",
        }
    }

    pub(crate) fn from_io(path: &std::path::Path, error: &std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::InvalidData => Self::Malformed {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
            _ => Self::Unknown {
                path: path.to_path_buf(),
                message: error.to_string(),
            },
        }
    }
}

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;
