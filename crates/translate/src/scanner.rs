//! Bundle scanner
//!
//! Locates the `api-resources` directory of an extracted bundle and lists its
//! resource files. The listing is sorted by path so revision ids come out the
//! same on every run over the same bundle.

use kinesnap_core::{Error, ResourceCatalog, Result, RESOURCE_FILE_EXTENSION};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Directory holding per-resource files inside a bundle
pub const RESOURCE_DIR_NAME: &str = "api-resources";

/// One resource file found in a bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceFile {
    /// Full path to the file
    pub path: PathBuf,
    /// Kind token from the file name (`pods`, `deployments`)
    pub kind: String,
    /// Group token from the file name (`yaml` for core resources)
    pub group: String,
}

impl ResourceFile {
    /// Build from a path whose file name follows the bundle convention
    pub fn from_path(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let (kind, group) = {
            let name = path.file_name()?.to_str()?;
            let (kind, group) = ResourceCatalog::parse_file_name(name)?;
            (kind.to_string(), group.to_string())
        };
        Some(ResourceFile { path, kind, group })
    }

    /// File name for operator messages
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Resource files of a bundle, split by whether they get translated
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    /// Directory the files were found in
    pub resource_dir: PathBuf,
    /// Files to translate, sorted by path
    pub files: Vec<ResourceFile>,
    /// Files of excluded kinds, sorted by path
    pub excluded: Vec<ResourceFile>,
}

/// Walks a bundle for resource files
#[derive(Debug, Clone, Copy, Default)]
pub struct BundleScanner {
    catalog: ResourceCatalog,
}

impl BundleScanner {
    /// Create a scanner using the given catalog for exclusions
    pub fn new(catalog: ResourceCatalog) -> Self {
        BundleScanner { catalog }
    }

    /// Find the resource directory under `root`
    ///
    /// `root` may itself be the resource directory. Otherwise the first
    /// directory named [`RESOURCE_DIR_NAME`] in sorted walk order is used.
    pub fn locate_resource_dir(root: &Path) -> Result<PathBuf> {
        if !root.is_dir() {
            return Err(Error::not_found("bundle directory", root));
        }
        if root.file_name().map_or(false, |n| n == RESOURCE_DIR_NAME) {
            return Ok(root.to_path_buf());
        }

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(root, e))?;
            if entry.file_type().is_dir() && entry.file_name() == RESOURCE_DIR_NAME {
                return Ok(entry.into_path());
            }
        }

        Err(Error::not_found(
            format!("{} directory", RESOURCE_DIR_NAME),
            root,
        ))
    }

    /// List the resource files of the bundle at `root`
    pub fn scan(&self, root: &Path) -> Result<ScanResult> {
        let resource_dir = Self::locate_resource_dir(root)?;
        let mut result = ScanResult {
            resource_dir: resource_dir.clone(),
            ..Default::default()
        };

        let mut paths = Vec::new();
        for entry in WalkDir::new(&resource_dir).sort_by_file_name() {
            let entry = entry.map_err(|e| walk_error(&resource_dir, e))?;
            let path = entry.path();
            if entry.file_type().is_file()
                && path.extension().map_or(false, |ext| ext == RESOURCE_FILE_EXTENSION)
            {
                paths.push(entry.into_path());
            }
        }
        paths.sort();

        for path in paths {
            let Some(file) = ResourceFile::from_path(&path) else {
                warn!("Ignoring unrecognized resource file name: {}", path.display());
                continue;
            };
            if self.catalog.is_excluded(&file.kind) {
                debug!("Excluding {} resource file: {}", file.kind, path.display());
                result.excluded.push(file);
            } else {
                result.files.push(file);
            }
        }

        debug!(
            "Scanned {}: {} resource files, {} excluded",
            resource_dir.display(),
            result.files.len(),
            result.excluded.len()
        );
        Ok(result)
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> Error {
    let path = err.path().map_or_else(|| root.to_path_buf(), Path::to_path_buf);
    Error::io(path, err.into())
}
