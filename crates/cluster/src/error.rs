//! Error types for cluster operations

use kinesnap_durability::DurabilityError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from cluster lifecycle, replay and log inspection
#[derive(Debug, Error)]
pub enum ClusterError {
    /// External program could not be started
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name
        program: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// External program exited unsuccessfully
    #[error("{command} exited with {}{}", status_text(.status), stderr_suffix(.stderr))]
    CommandFailed {
        /// Command line that failed
        command: String,
        /// Exit code, if the program exited normally
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// I/O error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Expected directory or file is absent
    #[error("not found: {what} ({})", .path.display())]
    NotFound {
        /// What was being looked for
        what: String,
        /// Where it was looked for
        path: PathBuf,
    },

    /// Current user could not be determined
    #[error("cannot determine the current user (USER and LOGNAME are unset)")]
    UnknownUser,

    /// Translation failed
    #[error(transparent)]
    Translate(#[from] kinesnap_core::Error),

    /// Artifact or store load failed
    #[error(transparent)]
    Durability(#[from] DurabilityError),
}

/// Result type for cluster operations
pub type ClusterResult<T> = Result<T, ClusterError>;

fn status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {}", stderr)
    }
}

impl ClusterError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClusterError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a not-found error
    pub fn not_found(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ClusterError::NotFound {
            what: what.into(),
            path: path.into(),
        }
    }
}
