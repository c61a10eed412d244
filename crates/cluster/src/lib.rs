//! Disposable cluster around a translated snapshot
//!
//! - runner: the seam every external program goes through
//! - lifecycle: k3d create/stop/start/delete
//! - ownership: reclaim the store directory from the container's root user
//! - replay: the `up`/`down` sequences over a bundle's working layout
//! - logs: captured pod logs inside a bundle

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lifecycle;
pub mod logs;
pub mod ownership;
pub mod replay;
pub mod runner;

pub use error::{ClusterError, ClusterResult};
pub use lifecycle::{
    K3dCluster, CREATE_WAIT_SECS, DB_MOUNT_TARGET, K3D_PROGRAM, KUBECONFIG_HINT, SERVER_ARGS,
};
pub use logs::{pager_invocation, PodLogEntry, PodLogIndex, DEFAULT_PAGER, POD_LOGS_DIR_NAME};
pub use ownership::{chown_invocation, current_user, fix_ownership, fix_ownership_as, DB_DIR_NAME};
pub use replay::{DownReport, Replay, ReplayLayout, UpReport, REPLAY_DIR_NAME};
pub use runner::{CommandRunner, Invocation, RecordingRunner, SystemRunner};
