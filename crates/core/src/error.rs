//! Error taxonomy for bundle translation
//!
//! Every variant here is fatal for a translation run. Informational outcomes
//! (empty resource files, excluded kinds) are reported as events by the
//! translator, never as errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while translating a bundle into store records
#[derive(Debug, Error)]
pub enum Error {
    /// Expected directory or file is absent
    #[error("not found: {what} ({})", .path.display())]
    NotFound {
        /// What was being looked for
        what: String,
        /// Where it was looked for
        path: PathBuf,
    },

    /// A captured object could not be parsed into kind/apiVersion/metadata.name
    #[error("malformed object in {}{}: {reason}", .path.display(), item_suffix(.index))]
    MalformedObject {
        /// Resource file containing the object
        path: PathBuf,
        /// Position of the object in the file's `items` list
        index: Option<usize>,
        /// What was wrong with it
        reason: String,
    },

    /// A rendered record could not be decoded back
    #[error("malformed record: {0}")]
    MalformedRecord(String),

    /// Translation options are unusable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The revision counter ran past i64::MAX
    #[error("revision counter overflow at {counter} (stride {stride})")]
    RevisionOverflow {
        /// Counter value when the overflow happened
        counter: i64,
        /// Stride that was being added
        stride: i64,
    },

    /// I/O error on a specific path
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, Error>;

fn item_suffix(index: &Option<usize>) -> String {
    match index {
        Some(i) => format!(" (item {})", i),
        None => String::new(),
    }
}

impl Error {
    /// Create a not-found error
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Error::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a malformed-object error for one item of a resource file
    pub fn malformed(path: impl Into<PathBuf>, index: usize, reason: impl Into<String>) -> Self {
        Error::MalformedObject {
            path: path.into(),
            index: Some(index),
            reason: reason.into(),
        }
    }

    /// Create a malformed-object error for a whole resource file
    pub fn malformed_document(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Error::MalformedObject {
            path: path.into(),
            index: None,
            reason: reason.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// Check if this is a malformed-object error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Error::MalformedObject { .. })
    }
}
