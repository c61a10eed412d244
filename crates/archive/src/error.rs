//! Error types for bundle extraction

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while extracting a support bundle
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// I/O error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Input is not a gzip stream
    #[error("{} is not a gzip archive", .path.display())]
    UnsupportedFormat {
        /// Archive path
        path: PathBuf,
    },

    /// Target bundle directory is already there
    #[error("bundle directory already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Ticket identifier is empty or unusable as a directory name
    #[error("invalid ticket: {0:?}")]
    InvalidTicket(String),

    /// Archive file does not exist
    #[error("archive not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Tar/gzip stream error
    #[error("archive error in {}: {message}", .path.display())]
    Archive {
        /// Archive being unpacked
        path: PathBuf,
        /// What went wrong
        message: String,
    },
}

/// Result type for extraction operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;

impl ArchiveError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an archive error
    pub fn archive(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ArchiveError::Archive {
            path: path.into(),
            message: message.into(),
        }
    }
}
