//! Bundle extractor
//!
//! Unpacks a captured support bundle into `<tickets_dir>/<ticket>/bundle-<stem>`.

use crate::error::{ArchiveError, ArchiveResult};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// First two bytes of every gzip stream
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Prefix of every extracted bundle directory
pub const BUNDLE_DIR_PREFIX: &str = "bundle-";

/// Directory of nested archives removed once they are unpacked
pub const NESTED_BUNDLES_DIR: &str = "bundles";

/// Outcome of a successful extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractReport {
    /// Directory the bundle was extracted into
    pub bundle_dir: PathBuf,
    /// Directories the nested archives were unpacked into, in walk order
    pub nested: Vec<PathBuf>,
}

/// Extracts support bundles into a tickets directory
#[derive(Debug, Clone)]
pub struct BundleExtractor {
    tickets_dir: PathBuf,
}

impl BundleExtractor {
    /// Create an extractor rooted at `tickets_dir`
    pub fn new(tickets_dir: impl Into<PathBuf>) -> Self {
        BundleExtractor {
            tickets_dir: tickets_dir.into(),
        }
    }

    /// Root all bundles are extracted under
    pub fn tickets_dir(&self) -> &Path {
        &self.tickets_dir
    }

    /// Where `archive` would be extracted for `ticket`
    pub fn target_dir(&self, archive: &Path, ticket: &str) -> ArchiveResult<PathBuf> {
        let ticket = validate_ticket(ticket)?;
        let file_name = archive
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArchiveError::NotFound(archive.to_path_buf()))?;
        Ok(self
            .tickets_dir
            .join(ticket)
            .join(bundle_dir_name(file_name)))
    }

    /// Extract `archive` for `ticket`
    ///
    /// Fails without touching anything when the archive is not gzip or the
    /// target directory exists already.
    pub fn extract(&self, archive: &Path, ticket: &str) -> ArchiveResult<ExtractReport> {
        if !archive.is_file() {
            return Err(ArchiveError::NotFound(archive.to_path_buf()));
        }
        if !is_gzip(archive)? {
            return Err(ArchiveError::UnsupportedFormat {
                path: archive.to_path_buf(),
            });
        }

        let bundle_dir = self.target_dir(archive, ticket)?;
        if bundle_dir.exists() {
            return Err(ArchiveError::AlreadyExists(bundle_dir));
        }
        fs::create_dir_all(&bundle_dir).map_err(|e| ArchiveError::io(&bundle_dir, e))?;

        info!(
            "Extracting {} to {}",
            archive.display(),
            bundle_dir.display()
        );

        match unpack_contents(archive, &bundle_dir) {
            Ok(nested) => {
                info!("Extracted bundle to {}", bundle_dir.display());
                Ok(ExtractReport { bundle_dir, nested })
            }
            Err(e) => {
                if let Err(cleanup) = fs::remove_dir_all(&bundle_dir) {
                    warn!(
                        "Failed to remove partial bundle {}: {}",
                        bundle_dir.display(),
                        cleanup
                    );
                }
                Err(e)
            }
        }
    }
}

fn unpack_contents(archive: &Path, bundle_dir: &Path) -> ArchiveResult<Vec<PathBuf>> {
    unpack_tar_gz(archive, bundle_dir)?;

    let mut nested_archives = Vec::new();
    for entry in WalkDir::new(bundle_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(bundle_dir).to_path_buf();
            ArchiveError::archive(path, e.to_string())
        })?;
        if entry.file_type().is_file() && is_gzip(entry.path())? {
            nested_archives.push(entry.into_path());
        }
    }

    let mut nested = Vec::with_capacity(nested_archives.len());
    for path in nested_archives {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            warn!("Skipping nested archive with non UTF-8 name: {}", path.display());
            continue;
        };
        let target = bundle_dir.join(nested_dir_name(name));
        debug!("Unpacking nested {} into {}", path.display(), target.display());
        fs::create_dir_all(&target).map_err(|e| ArchiveError::io(&target, e))?;
        unpack_tar_gz(&path, &target)?;
        nested.push(target);
    }

    let bundles = bundle_dir.join(NESTED_BUNDLES_DIR);
    if bundles.is_dir() {
        fs::remove_dir_all(&bundles).map_err(|e| ArchiveError::io(&bundles, e))?;
    }
    Ok(nested)
}

fn unpack_tar_gz(path: &Path, into: &Path) -> ArchiveResult<()> {
    let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    archive.set_overwrite(true);
    archive
        .unpack(into)
        .map_err(|e| ArchiveError::archive(path, e.to_string()))
}

/// Whether the file at `path` starts with the gzip magic bytes
pub fn is_gzip(path: &Path) -> ArchiveResult<bool> {
    let mut file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut magic = [0u8; 2];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..]) {
            Ok(0) => return Ok(false),
            Ok(n) => read += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(ArchiveError::io(path, e)),
        }
    }
    Ok(magic == GZIP_MAGIC)
}

/// `bundle-<stem>` where the stem is the file name up to its first `.`
pub fn bundle_dir_name(file_name: &str) -> String {
    let stem = file_name.split('.').next().unwrap_or(file_name);
    format!("{}{}", BUNDLE_DIR_PREFIX, stem)
}

fn nested_dir_name(file_name: &str) -> &str {
    let name = file_name.strip_suffix(".gz").unwrap_or(file_name);
    name.strip_suffix(".tar").unwrap_or(name)
}

fn validate_ticket(ticket: &str) -> ArchiveResult<&str> {
    let trimmed = ticket.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || trimmed.contains(['/', '\\'])
    {
        return Err(ArchiveError::InvalidTicket(ticket.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn tar_gz(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (path, data) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, path, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_bundle_dir_name() {
        assert_eq!(bundle_dir_name("support.tar.gz"), "bundle-support");
        assert_eq!(bundle_dir_name("capture-01.tgz"), "bundle-capture-01");
        assert_eq!(bundle_dir_name("plain"), "bundle-plain");
    }

    #[test]
    fn test_nested_dir_name() {
        assert_eq!(nested_dir_name("node-a.tar.gz"), "node-a");
        assert_eq!(nested_dir_name("node-a.gz"), "node-a");
        assert_eq!(nested_dir_name("node-a"), "node-a");
    }

    #[test]
    fn test_extract_with_nested_archive() {
        let temp_dir = TempDir::new().unwrap();
        let nested = tar_gz(&[("logs/kubelet.log", b"started\n")]);
        let outer = tar_gz(&[
            ("api-resources/pods.yaml", b"items: []\n"),
            ("bundles/node-a.tar.gz", &nested),
        ]);
        let archive = temp_dir.path().join("support.tar.gz");
        fs::write(&archive, outer).unwrap();

        let extractor = BundleExtractor::new(temp_dir.path().join("tickets"));
        let report = extractor.extract(&archive, "T-1").unwrap();

        let bundle_dir = temp_dir.path().join("tickets/T-1/bundle-support");
        assert_eq!(report.bundle_dir, bundle_dir);
        assert_eq!(report.nested, vec![bundle_dir.join("node-a")]);
        assert!(bundle_dir.join("api-resources/pods.yaml").is_file());
        assert_eq!(
            fs::read_to_string(bundle_dir.join("node-a/logs/kubelet.log")).unwrap(),
            "started\n"
        );
        assert!(!bundle_dir.join(NESTED_BUNDLES_DIR).exists());
    }

    #[test]
    fn test_existing_target_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("support.tar.gz");
        fs::write(&archive, tar_gz(&[("a.txt", b"a")])).unwrap();

        let extractor = BundleExtractor::new(temp_dir.path());
        extractor.extract(&archive, "T-1").unwrap();
        assert!(matches!(
            extractor.extract(&archive, "T-1"),
            Err(ArchiveError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_non_gzip_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("support.zip");
        fs::write(&archive, b"PK\x03\x04").unwrap();

        let extractor = BundleExtractor::new(temp_dir.path());
        assert!(matches!(
            extractor.extract(&archive, "T-1"),
            Err(ArchiveError::UnsupportedFormat { .. })
        ));
        assert!(!temp_dir.path().join("T-1").exists());
    }

    #[test]
    fn test_corrupt_gzip_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("support.tar.gz");
        fs::write(&archive, [0x1f, 0x8b, 0x00, 0x01, 0x02]).unwrap();

        let extractor = BundleExtractor::new(temp_dir.path());
        assert!(matches!(
            extractor.extract(&archive, "T-1"),
            Err(ArchiveError::Archive { .. })
        ));
        assert!(!temp_dir.path().join("T-1/bundle-support").exists());
    }

    #[test]
    fn test_invalid_ticket() {
        let temp_dir = TempDir::new().unwrap();
        let archive = temp_dir.path().join("support.tar.gz");
        fs::write(&archive, tar_gz(&[("a.txt", b"a")])).unwrap();

        let extractor = BundleExtractor::new(temp_dir.path());
        for ticket in ["", "  ", "..", "a/b"] {
            assert!(matches!(
                extractor.extract(&archive, ticket),
                Err(ArchiveError::InvalidTicket(_))
            ));
        }
    }

    #[test]
    fn test_missing_archive() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = BundleExtractor::new(temp_dir.path());
        assert!(matches!(
            extractor.extract(&temp_dir.path().join("none.tar.gz"), "T-1"),
            Err(ArchiveError::NotFound(_))
        ));
    }
}
