//! Settings resolved from flags and the environment.

use anyhow::{anyhow, bail, Result};
use kinesnap::archive::BUNDLE_DIR_PREFIX;
use std::path::{Path, PathBuf};

/// Where extracted bundles are kept.
pub const TICKETS_DIR_ENV: &str = "KINESNAP_TICKETS_DIR";

/// Where raw captures are downloaded to.
pub const CAPTURES_DIR_ENV: &str = "KINESNAP_CAPTURES_DIR";

/// Tickets directory under `$HOME` when the variable is unset.
pub const DEFAULT_TICKETS_SUBDIR: &str = "Documents/logs/tickets";

/// Resolved CLI settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub tickets_dir: Option<PathBuf>,
    pub captures_dir: Option<PathBuf>,
    pub bundle_override: Option<PathBuf>,
    pub verbose: bool,
    pub color: bool,
}

impl Settings {
    /// Build settings from parsed flags and the process environment.
    pub fn from_matches(matches: &clap::ArgMatches) -> Self {
        Self::resolve(matches, |name| std::env::var(name).ok())
    }

    /// Build settings with an explicit environment lookup.
    pub fn resolve(matches: &clap::ArgMatches, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

        let tickets_dir = non_empty(TICKETS_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| non_empty("HOME").map(|home| Path::new(&home).join(DEFAULT_TICKETS_SUBDIR)));

        Settings {
            tickets_dir,
            captures_dir: non_empty(CAPTURES_DIR_ENV).map(PathBuf::from),
            bundle_override: matches.get_one::<PathBuf>("bundle").cloned(),
            verbose: matches.get_flag("verbose"),
            color: !matches.get_flag("no-color"),
        }
    }

    /// Tickets directory, or an error naming how to set it.
    pub fn tickets_dir(&self) -> Result<&Path> {
        self.tickets_dir.as_deref().ok_or_else(|| {
            anyhow!(
                "cannot determine the tickets directory; set {} or HOME",
                TICKETS_DIR_ENV
            )
        })
    }

    /// Bundle root for commands that work on an extracted bundle.
    pub fn bundle_root(&self, cwd: &Path) -> Result<PathBuf> {
        resolve_bundle_root(self.bundle_override.as_deref(), cwd)
    }

    /// Locate an archive given on the command line.
    pub fn archive_path(&self, archive: &Path, cwd: &Path) -> PathBuf {
        resolve_archive_path(archive, cwd, self.captures_dir.as_deref())
    }
}

/// Explicit override, else the nearest ancestor of `cwd` named `bundle-*`.
pub fn resolve_bundle_root(bundle_override: Option<&Path>, cwd: &Path) -> Result<PathBuf> {
    if let Some(path) = bundle_override {
        if !path.is_dir() {
            bail!("bundle directory not found: {}", path.display());
        }
        return Ok(path.to_path_buf());
    }

    cwd.ancestors()
        .find(|dir| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .map_or(false, |n| n.starts_with(BUNDLE_DIR_PREFIX))
        })
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            anyhow!(
                "not inside a {}* directory ({}); pass --bundle",
                BUNDLE_DIR_PREFIX,
                cwd.display()
            )
        })
}

/// `archive` as given when it exists relative to `cwd`, else under the
/// captures directory when it exists there.
pub fn resolve_archive_path(archive: &Path, cwd: &Path, captures_dir: Option<&Path>) -> PathBuf {
    let local = cwd.join(archive);
    if archive.is_absolute() || local.exists() {
        return local;
    }
    match captures_dir.map(|dir| dir.join(archive)) {
        Some(captured) if captured.exists() => captured,
        _ => local,
    }
}
