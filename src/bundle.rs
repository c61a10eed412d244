//! Bundle facade
//!
//! An extracted support bundle on disk and everything that can be done with
//! it.

use crate::error::{Error, Result};
use kinesnap_archive::{BundleExtractor, ExtractReport};
use kinesnap_cluster::replay::translate_bundle;
use kinesnap_cluster::{CommandRunner, DownReport, PodLogIndex, Replay, ReplayLayout, UpReport};
use kinesnap_core::KvRecord;
use kinesnap_durability::ArtifactManifest;
use kinesnap_translate::{TranslateOptions, TranslationEvent, TranslationReport, Translator};
use std::path::{Path, PathBuf};

/// An extracted support bundle
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    /// Open the bundle extracted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::BundleNotFound(root.display().to_string()));
        }
        Ok(Bundle { root })
    }

    /// Extract `archive` for `ticket` under `tickets_dir` and open the result
    pub fn extract(tickets_dir: &Path, archive: &Path, ticket: &str) -> Result<(Self, ExtractReport)> {
        let report = BundleExtractor::new(tickets_dir).extract(archive, ticket)?;
        let bundle = Bundle::open(&report.bundle_dir)?;
        Ok((bundle, report))
    }

    /// Bundle root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working layout used by `up`/`down`
    pub fn layout(&self) -> ReplayLayout {
        ReplayLayout::for_bundle(&self.root)
    }

    /// Translate into an in-memory list of records
    pub fn records(&self, options: TranslateOptions) -> Result<(Vec<KvRecord>, TranslationReport)> {
        let mut records = Vec::new();
        let report = Translator::new(options)?.translate(&self.root, &mut records)?;
        Ok((records, report))
    }

    /// Translate into an artifact at `artifact`
    pub fn translate_to(
        &self,
        artifact: &Path,
        options: TranslateOptions,
        observer: &mut dyn FnMut(&TranslationEvent),
    ) -> Result<(TranslationReport, ArtifactManifest)> {
        Ok(translate_bundle(&self.root, artifact, options, observer)?)
    }

    /// Replay into a fresh cluster
    pub fn up(
        &self,
        runner: &mut dyn CommandRunner,
        options: TranslateOptions,
        observer: &mut dyn FnMut(&TranslationEvent),
    ) -> Result<UpReport> {
        Ok(Replay::new(self.layout(), runner).up(options, observer)?)
    }

    /// Tear the replay down
    pub fn down(&self, runner: &mut dyn CommandRunner) -> Result<DownReport> {
        Ok(Replay::new(self.layout(), runner).down()?)
    }

    /// Captured pod logs
    pub fn pod_logs(&self) -> Result<PodLogIndex> {
        Ok(PodLogIndex::locate(&self.root)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing() {
        let temp_dir = TempDir::new().unwrap();
        let err = Bundle::open(temp_dir.path().join("bundle-x")).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_records_without_resources() {
        let temp_dir = TempDir::new().unwrap();
        let bundle = Bundle::open(temp_dir.path()).unwrap();
        let err = bundle.records(TranslateOptions::default()).unwrap_err();
        assert!(err.is_not_found());
    }
}
