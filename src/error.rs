//! Fatal error types for listing setup.
//!
//! Recoverable per-entry faults never surface here; they are routed to the
//! session's error/warning channels so traversal can continue. These variants
//! cover the cases that abort before or during setup.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("listing name contains invalid characters")]
    InvalidListingName,
    #[error("could not create output directory \"{path}\": {source}")]
    OutputBase {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl ListError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ListError::Io {
            path: path.into(),
            source,
        }
    }
}
