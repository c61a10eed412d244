//! Replay orchestration
//!
//! Working layout under a bundle root:
//!
//! ```text
//! <bundle>/.kinesnap/
//! ├── snapshot.sql                 # artifact
//! ├── snapshot.sql.manifest.json
//! └── db/                          # mounted as the server's store directory
//!     └── state.db
//! ```
//!
//! `up` translates, creates the cluster, stops it so the store file is idle,
//! loads the artifact and starts it again. `down` deletes the cluster and
//! the working directory.

use crate::error::{ClusterError, ClusterResult};
use crate::lifecycle::K3dCluster;
use crate::ownership::{fix_ownership, fix_ownership_as, DB_DIR_NAME};
use crate::runner::CommandRunner;
use kinesnap_durability::{ArtifactManifest, ArtifactWriter, LoadOptions, LoadReport, SnapshotLoader};
use kinesnap_translate::{TranslateOptions, TranslationEvent, TranslationReport, Translator};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Working directory name under the bundle root
pub const REPLAY_DIR_NAME: &str = ".kinesnap";

/// Artifact file name inside the working directory
pub const ARTIFACT_FILE_NAME: &str = "snapshot.sql";

/// Store file name inside the store directory
pub const STATE_DB_FILE_NAME: &str = "state.db";

/// Paths used while replaying one bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayLayout {
    /// Extracted bundle
    pub bundle_root: PathBuf,
    /// Working directory
    pub resource_dir: PathBuf,
    /// Store directory, mounted into the cluster
    pub db_dir: PathBuf,
    /// Store file
    pub state_db: PathBuf,
    /// Artifact
    pub artifact: PathBuf,
}

impl ReplayLayout {
    /// Standard layout for `bundle_root`
    pub fn for_bundle(bundle_root: impl Into<PathBuf>) -> Self {
        let bundle_root = bundle_root.into();
        let resource_dir = bundle_root.join(REPLAY_DIR_NAME);
        let db_dir = resource_dir.join(DB_DIR_NAME);
        ReplayLayout {
            state_db: db_dir.join(STATE_DB_FILE_NAME),
            artifact: resource_dir.join(ARTIFACT_FILE_NAME),
            bundle_root,
            resource_dir,
            db_dir,
        }
    }
}

/// Outcome of `up`
#[derive(Debug, Clone)]
pub struct UpReport {
    /// Translation summary
    pub translation: TranslationReport,
    /// Manifest of the artifact that was loaded
    pub manifest: ArtifactManifest,
    /// Load summary
    pub load: LoadReport,
}

/// Outcome of `down`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownReport {
    /// `k3d delete` succeeded
    pub cluster_deleted: bool,
    /// The working directory existed and was removed
    pub resource_dir_removed: bool,
}

/// Translate `bundle_root` into an artifact at `artifact`
///
/// The artifact only appears once translation has succeeded.
pub fn translate_bundle(
    bundle_root: &Path,
    artifact: &Path,
    options: TranslateOptions,
    observer: &mut dyn FnMut(&TranslationEvent),
) -> ClusterResult<(TranslationReport, ArtifactManifest)> {
    let translator = Translator::new(options)?;
    let mut writer = ArtifactWriter::create(artifact)?;
    let report = translator.translate_observed(bundle_root, &mut writer, observer)?;
    let manifest = writer.finish()?;
    Ok((report, manifest))
}

/// Replays one bundle into a disposable cluster
pub struct Replay<'a> {
    layout: ReplayLayout,
    cluster: K3dCluster,
    runner: &'a mut dyn CommandRunner,
    owner: Option<String>,
}

impl<'a> Replay<'a> {
    /// Replay `layout` through `runner` with the default k3d cluster
    pub fn new(layout: ReplayLayout, runner: &'a mut dyn CommandRunner) -> Self {
        Replay {
            layout,
            cluster: K3dCluster::default(),
            runner,
            owner: None,
        }
    }

    /// Use a different cluster driver
    pub fn with_cluster(mut self, cluster: K3dCluster) -> Self {
        self.cluster = cluster;
        self
    }

    /// Reclaim the store directory for `user` instead of the current user
    pub fn with_owner(mut self, user: impl Into<String>) -> Self {
        self.owner = Some(user.into());
        self
    }

    /// Paths this replay works with
    pub fn layout(&self) -> &ReplayLayout {
        &self.layout
    }

    /// Translate, create the cluster, load the snapshot and start it
    pub fn up(
        &mut self,
        options: TranslateOptions,
        observer: &mut dyn FnMut(&TranslationEvent),
    ) -> ClusterResult<UpReport> {
        let (translation, manifest) = translate_bundle(
            &self.layout.bundle_root,
            &self.layout.artifact,
            options,
            observer,
        )?;

        fs::create_dir_all(&self.layout.db_dir)
            .map_err(|e| ClusterError::io(&self.layout.db_dir, e))?;

        self.cluster.create(self.runner, &self.layout.db_dir)?;
        self.cluster.stop(self.runner)?;
        self.reclaim_store()?;

        info!("Adding cluster resources");
        let load = SnapshotLoader::load(
            &self.layout.artifact,
            &self.layout.state_db,
            LoadOptions::default(),
        )?;

        self.cluster.start(self.runner)?;
        Ok(UpReport {
            translation,
            manifest,
            load,
        })
    }

    /// Delete the cluster and the working directory
    ///
    /// A failed delete or a missing working directory is logged, not fatal.
    pub fn down(&mut self) -> ClusterResult<DownReport> {
        let cluster_deleted = match self.cluster.delete(self.runner) {
            Ok(()) => {
                info!("Removed k3d cluster");
                true
            }
            Err(e) => {
                warn!("Failed to remove k3d cluster: {}", e);
                false
            }
        };

        let resource_dir = self.layout.resource_dir.clone();
        if !resource_dir.is_dir() {
            warn!(
                "Resource directory {} does not exist, nothing to remove",
                resource_dir.display()
            );
            return Ok(DownReport {
                cluster_deleted,
                resource_dir_removed: false,
            });
        }

        self.reclaim_store()?;
        fs::remove_dir_all(&resource_dir).map_err(|e| ClusterError::io(&resource_dir, e))?;
        info!("Removed resource directory {}", resource_dir.display());

        Ok(DownReport {
            cluster_deleted,
            resource_dir_removed: true,
        })
    }

    fn reclaim_store(&mut self) -> ClusterResult<bool> {
        match &self.owner {
            Some(user) if cfg!(target_os = "linux") => {
                fix_ownership_as(self.runner, &self.layout.resource_dir, user)
            }
            Some(_) => Ok(false),
            None => fix_ownership(self.runner, &self.layout.resource_dir),
        }
    }
}
