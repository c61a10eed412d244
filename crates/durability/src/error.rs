//! Artifact and loader errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors reading, writing or loading a snapshot artifact
#[derive(Debug, Error)]
pub enum DurabilityError {
    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Artifact file does not exist
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A line of the artifact is not a complete record
    #[error("malformed statement at {}:{line}: {source}", .path.display())]
    MalformedStatement {
        /// Artifact path
        path: PathBuf,
        /// 1-based line number
        line: usize,
        /// Decode failure
        #[source]
        source: kinesnap_core::Error,
    },

    /// Artifact bytes do not match the manifest checksum
    #[error("checksum mismatch for {}: expected {expected}, got {actual}", .path.display())]
    ChecksumMismatch {
        /// Artifact path
        path: PathBuf,
        /// Checksum recorded in the manifest
        expected: String,
        /// Checksum of the artifact on disk
        actual: String,
    },

    /// Artifact record count does not match the manifest
    #[error("record count mismatch: manifest says {expected}, artifact has {actual}")]
    CountMismatch {
        /// Count recorded in the manifest
        expected: u64,
        /// Count found in the artifact
        actual: u64,
    },

    /// Manifest format version is not supported
    #[error("unsupported artifact format version {version}")]
    UnsupportedVersion {
        /// Version found in the manifest
        version: u32,
    },

    /// Manifest could not be (de)serialized
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),

    /// Translation-level error (emitting or ordering records)
    #[error(transparent)]
    Translate(#[from] kinesnap_core::Error),

    /// Store file error
    #[error("store error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for durability operations
pub type DurabilityResult<T> = std::result::Result<T, DurabilityError>;

impl DurabilityError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DurabilityError::Io {
            path: path.into(),
            source,
        }
    }
}
