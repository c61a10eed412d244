//! Captured pod logs
//!
//! Bundles keep one file per pod under a `pods_logs` directory, named
//! `<namespace>_<pod>.log`.

use crate::error::{ClusterError, ClusterResult};
use crate::runner::{CommandRunner, Invocation};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

/// Directory holding pod logs
pub const POD_LOGS_DIR_NAME: &str = "pods_logs";

/// Pager used when `PAGER` is unset
pub const DEFAULT_PAGER: &str = "less";

const LOG_EXTENSION: &str = "log";

/// One pod's log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodLogEntry {
    /// Pod namespace
    pub namespace: String,
    /// Pod name
    pub pod: String,
    /// Log file
    pub path: PathBuf,
}

/// Pod logs found in a bundle
#[derive(Debug, Clone)]
pub struct PodLogIndex {
    dir: PathBuf,
    entries: Vec<PodLogEntry>,
}

impl PodLogIndex {
    /// Find the pod logs directory under `bundle_root` and index it
    ///
    /// The first `pods_logs` directory in sorted walk order wins.
    pub fn locate(bundle_root: &Path) -> ClusterResult<Self> {
        let dir = WalkDir::new(bundle_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .find(|e| e.file_type().is_dir() && e.file_name() == POD_LOGS_DIR_NAME)
            .map(|e| e.into_path())
            .ok_or_else(|| ClusterError::not_found("pod logs directory", bundle_root))?;
        Self::open(dir)
    }

    /// Index an explicit pod logs directory
    pub fn open(dir: impl Into<PathBuf>) -> ClusterResult<Self> {
        let dir = dir.into();
        let mut entries = Vec::new();
        for entry in WalkDir::new(&dir).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(&dir).to_path_buf();
                ClusterError::io(path, e.into())
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION)
            {
                continue;
            }
            match parse_log_name(path) {
                Some((namespace, pod)) => entries.push(PodLogEntry {
                    namespace,
                    pod,
                    path: path.to_path_buf(),
                }),
                None => warn!("Skipping log file without namespace: {}", path.display()),
            }
        }
        Ok(PodLogIndex { dir, entries })
    }

    /// Directory the index was built from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All pod logs, sorted by path
    pub fn entries(&self) -> &[PodLogEntry] {
        &self.entries
    }

    /// Log for one pod
    pub fn find(&self, namespace: &str, pod: &str) -> ClusterResult<&PodLogEntry> {
        self.entries
            .iter()
            .find(|e| e.namespace == namespace && e.pod == pod)
            .ok_or_else(|| {
                ClusterError::not_found(
                    format!("log for pod {} in namespace {}", pod, namespace),
                    &self.dir,
                )
            })
    }

    /// Show one pod's log in the pager
    pub fn page(
        &self,
        runner: &mut dyn CommandRunner,
        namespace: &str,
        pod: &str,
    ) -> ClusterResult<PathBuf> {
        let entry = self.find(namespace, pod)?;
        info!("Opening pod log file: {}", entry.path.display());
        runner.run(&pager_invocation(
            std::env::var("PAGER").ok().as_deref(),
            &entry.path,
        ))?;
        Ok(entry.path.clone())
    }
}

/// Pager command for `file`, from a `PAGER` value
///
/// The value may carry arguments (`less -R`); blank means the default.
pub fn pager_invocation(pager: Option<&str>, file: &Path) -> Invocation {
    let mut words: Vec<String> = pager
        .unwrap_or_default()
        .split_whitespace()
        .map(str::to_string)
        .collect();
    if words.is_empty() {
        words.push(DEFAULT_PAGER.to_string());
    }
    let program = words.remove(0);
    words.push(file.display().to_string());
    Invocation::new(program, words).attached()
}

fn parse_log_name(path: &Path) -> Option<(String, String)> {
    let stem = path.file_stem()?.to_str()?;
    let (namespace, pod) = stem.split_once('_')?;
    if namespace.is_empty() || pod.is_empty() {
        return None;
    }
    Some((namespace.to_string(), pod.to_string()))
}
