//! Store directory ownership
//!
//! On Linux the server container writes the store directory as root, which
//! leaves the operator unable to load into or remove it. The fix hands the
//! directory back with `sudo chown -R`.

use crate::error::{ClusterError, ClusterResult};
use crate::runner::{CommandRunner, Invocation};
use std::path::Path;
use tracing::debug;

/// Store directory name under the working directory
pub const DB_DIR_NAME: &str = "db";

/// Name of the user running the tool, from `USER` then `LOGNAME`
pub fn current_user() -> ClusterResult<String> {
    ["USER", "LOGNAME"]
        .iter()
        .filter_map(std::env::var_os)
        .map(|v| v.to_string_lossy().into_owned())
        .find(|v| !v.is_empty())
        .ok_or(ClusterError::UnknownUser)
}

/// `sudo chown -R <user> <dir>`
pub fn chown_invocation(user: &str, dir: &Path) -> Invocation {
    Invocation::new(
        "sudo",
        [
            "chown".to_string(),
            "-R".to_string(),
            user.to_string(),
            dir.display().to_string(),
        ],
    )
}

/// Reclaim `<resource_dir>/db` for the current user
///
/// Returns whether a chown was run. Nothing happens off Linux or when the
/// store directory does not exist.
pub fn fix_ownership(runner: &mut dyn CommandRunner, resource_dir: &Path) -> ClusterResult<bool> {
    let db_dir = resource_dir.join(DB_DIR_NAME);
    if !cfg!(target_os = "linux") || !db_dir.is_dir() {
        debug!("No ownership fix needed for {}", db_dir.display());
        return Ok(false);
    }
    fix_ownership_as(runner, resource_dir, &current_user()?)
}

/// Reclaim `<resource_dir>/db` for `user`, whatever the host
///
/// Returns whether a chown was run.
pub fn fix_ownership_as(
    runner: &mut dyn CommandRunner,
    resource_dir: &Path,
    user: &str,
) -> ClusterResult<bool> {
    let db_dir = resource_dir.join(DB_DIR_NAME);
    if !db_dir.is_dir() {
        return Ok(false);
    }
    debug!("Changing owner of {} to {}", db_dir.display(), user);
    runner.run(&chown_invocation(user, &db_dir))?;
    Ok(true)
}
