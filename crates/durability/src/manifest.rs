//! Artifact manifest
//!
//! Written next to the artifact as `<artifact>.manifest.json` once the
//! artifact is complete:
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "record_count": 2,
//!   "first_id": 100000000,
//!   "last_id": 100000004,
//!   "checksum": "9f0c...",
//!   "created_at": "2026-01-01T00:00:00+00:00"
//! }
//! ```

use crate::error::{DurabilityError, DurabilityResult};
use kinesnap_core::Revision;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current manifest format version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Summary of a finished artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    /// Manifest format version
    pub format_version: u32,
    /// Number of statements in the artifact
    pub record_count: u64,
    /// Id of the first record
    pub first_id: Option<Revision>,
    /// Id of the last record
    pub last_id: Option<Revision>,
    /// xxh3 of the artifact bytes, lowercase hex
    pub checksum: String,
    /// When the artifact was finished (RFC 3339)
    pub created_at: String,
}

impl ArtifactManifest {
    /// Write as pretty JSON
    pub fn write(&self, path: &Path) -> DurabilityResult<()> {
        let json = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, json).map_err(|e| DurabilityError::io(path, e))
    }

    /// Read and check the format version
    pub fn read(path: &Path) -> DurabilityResult<Self> {
        let data = std::fs::read(path).map_err(|e| DurabilityError::io(path, e))?;
        let manifest: ArtifactManifest = serde_json::from_slice(&data)?;
        if manifest.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(DurabilityError::UnsupportedVersion {
                version: manifest.format_version,
            });
        }
        Ok(manifest)
    }
}

/// Manifest location for an artifact
pub fn manifest_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".manifest.json");
    artifact.with_file_name(name)
}

/// xxh3-64 of `data` as 16 lowercase hex digits
pub fn xxh3_hex(data: &[u8]) -> String {
    format!("{:016x}", xxhash_rust::xxh3::xxh3_64(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_manifest_path() {
        assert_eq!(
            manifest_path(Path::new("/b/.kinesnap/snapshot.sql")),
            PathBuf::from("/b/.kinesnap/snapshot.sql.manifest.json")
        );
    }

    #[test]
    fn test_xxh3_hex_is_stable() {
        let a = xxh3_hex(b"hello");
        assert_eq!(a.len(), 16);
        assert_eq!(a, xxh3_hex(b"hello"));
        assert_ne!(a, xxh3_hex(b"hello!"));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("m.json");
        let manifest = ArtifactManifest {
            format_version: 99,
            record_count: 0,
            first_id: None,
            last_id: None,
            checksum: xxh3_hex(b""),
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        };
        manifest.write(&path).unwrap();
        assert!(matches!(
            ArtifactManifest::read(&path),
            Err(DurabilityError::UnsupportedVersion { version: 99 })
        ));
    }
}
