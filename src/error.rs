//! Error types for g2pm.
//!
//! Only descriptor loading can fail a whole run. Target-level failures are
//! reported as data in [`crate::build::BuildResult`].

use std::path::PathBuf;
use thiserror::Error;

/// Project descriptor loading errors
#[derive(Error, Debug)]
pub enum DescriptorError {
    /// The descriptor file does not exist
    #[error("Project descriptor not found: {path}")]
    NotFound { path: PathBuf },

    /// Required fields are missing or have the wrong type
    #[error("Malformed project descriptor '{path}': {source}")]
    Malformed {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// The file exists but could not be read
    #[error("IO error reading '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}
