//! Unified error type for kinesnap.
//!
//! Wraps the error of every layer so callers of the facade deal with a single
//! type.

use kinesnap_archive::ArchiveError;
use kinesnap_cluster::ClusterError;
use kinesnap_durability::DurabilityError;
use thiserror::Error;

/// All kinesnap errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Bundle directory does not exist
    #[error("bundle not found: {0}")]
    BundleNotFound(String),

    /// Translation failed
    #[error(transparent)]
    Translate(#[from] kinesnap_core::Error),

    /// Artifact or store load failed
    #[error(transparent)]
    Durability(#[from] DurabilityError),

    /// Extraction failed
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Cluster, replay or log inspection failed
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}

/// Result type for kinesnap operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error means something expected was absent.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::BundleNotFound(_) => true,
            Error::Translate(e) => e.is_not_found(),
            Error::Durability(e) => matches!(e, DurabilityError::NotFound(_)),
            Error::Archive(e) => matches!(e, ArchiveError::NotFound(_)),
            Error::Cluster(ClusterError::NotFound { .. }) => true,
            Error::Cluster(ClusterError::Translate(e)) => e.is_not_found(),
            Error::Cluster(ClusterError::Durability(DurabilityError::NotFound(_))) => true,
            Error::Cluster(_) => false,
        }
    }

    /// Check if this error is about malformed input data.
    pub fn is_malformed(&self) -> bool {
        match self {
            Error::Translate(e) | Error::Cluster(ClusterError::Translate(e)) => e.is_malformed(),
            Error::Durability(e) | Error::Cluster(ClusterError::Durability(e)) => matches!(
                e,
                DurabilityError::MalformedStatement { .. }
                    | DurabilityError::ChecksumMismatch { .. }
                    | DurabilityError::CountMismatch { .. }
            ),
            _ => false,
        }
    }
}
