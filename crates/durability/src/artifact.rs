//! Snapshot artifact file
//!
//! The artifact is a plain text file with one insert statement per line, in
//! record id order. It is write-once:
//!
//! - the writer appends to `<artifact>.partial` and only renames it into place
//!   in [`ArtifactWriter::finish`], after flushing and syncing
//! - a writer dropped without `finish` removes its partial file
//! - the manifest is written last, so its presence implies a complete artifact
//!
//! The reader decodes every line before returning anything, so a damaged
//! artifact is rejected as a whole.

use crate::error::{DurabilityError, DurabilityResult};
use crate::manifest::{manifest_path, xxh3_hex, ArtifactManifest, ARTIFACT_FORMAT_VERSION};
use kinesnap_core::{Error, KvRecord, RecordSink, Revision};
use kinesnap_translate::{decode, emit};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::Xxh3;

/// Append-only writer for a snapshot artifact
pub struct ArtifactWriter {
    path: PathBuf,
    partial_path: PathBuf,
    writer: Option<BufWriter<File>>,
    hasher: Xxh3,
    record_count: u64,
    first_id: Option<Revision>,
    last_id: Option<Revision>,
}

impl ArtifactWriter {
    /// Start a new artifact at `path`
    ///
    /// Any previous artifact at `path` stays untouched until `finish`.
    pub fn create(path: impl Into<PathBuf>) -> DurabilityResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DurabilityError::io(parent, e))?;
        }
        let partial_path = partial_path(&path);
        let file = File::create(&partial_path).map_err(|e| DurabilityError::io(&partial_path, e))?;
        debug!("Writing artifact to {}", partial_path.display());

        Ok(ArtifactWriter {
            path,
            partial_path,
            writer: Some(BufWriter::new(file)),
            hasher: Xxh3::new(),
            record_count: 0,
            first_id: None,
            last_id: None,
        })
    }

    /// Final artifact path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Records written so far
    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Flush, sync and move the artifact into place, then write its manifest
    pub fn finish(mut self) -> DurabilityResult<ArtifactManifest> {
        let writer = match self.writer.take() {
            Some(writer) => writer,
            None => return Err(DurabilityError::NotFound(self.partial_path.clone())),
        };
        let file = writer
            .into_inner()
            .map_err(|e| DurabilityError::io(&self.partial_path, e.into_error()))?;
        file.sync_all()
            .map_err(|e| DurabilityError::io(&self.partial_path, e))?;
        drop(file);

        fs::rename(&self.partial_path, &self.path)
            .map_err(|e| DurabilityError::io(&self.path, e))?;

        let manifest = ArtifactManifest {
            format_version: ARTIFACT_FORMAT_VERSION,
            record_count: self.record_count,
            first_id: self.first_id,
            last_id: self.last_id,
            checksum: format!("{:016x}", self.hasher.digest()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        manifest.write(&manifest_path(&self.path))?;

        info!(
            "Wrote {} records to {}",
            self.record_count,
            self.path.display()
        );
        Ok(manifest)
    }

    fn append(&mut self, record: &KvRecord) -> kinesnap_core::Result<()> {
        if let Some(last) = self.last_id {
            if record.id <= last {
                return Err(Error::MalformedRecord(format!(
                    "record id {} does not increase past {}",
                    record.id, last
                )));
            }
        }

        let mut line = emit(record)?;
        line.push(b'\n');

        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| Error::not_found("open artifact", &self.partial_path))?;
        writer
            .write_all(&line)
            .map_err(|e| Error::io(&self.partial_path, e))?;

        self.hasher.update(&line);
        self.record_count += 1;
        self.first_id.get_or_insert(record.id);
        self.last_id = Some(record.id);
        Ok(())
    }
}

impl RecordSink for ArtifactWriter {
    fn write_record(&mut self, record: &KvRecord) -> kinesnap_core::Result<()> {
        self.append(record)
    }
}

impl Drop for ArtifactWriter {
    fn drop(&mut self) {
        if self.writer.take().is_some() {
            if let Err(e) = fs::remove_file(&self.partial_path) {
                warn!(
                    "Failed to remove partial artifact {}: {}",
                    self.partial_path.display(),
                    e
                );
            }
        }
    }
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// One decoded line of an artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// 1-based line number
    pub line: usize,
    /// Statement text, without the line terminator
    pub text: String,
    /// Record the statement inserts
    pub record: KvRecord,
}

/// Reader for snapshot artifacts
pub struct ArtifactReader;

impl ArtifactReader {
    /// Read the artifact's manifest, if one was written
    pub fn read_manifest(artifact: &Path) -> DurabilityResult<Option<ArtifactManifest>> {
        let path = manifest_path(artifact);
        if !path.exists() {
            return Ok(None);
        }
        ArtifactManifest::read(&path).map(Some)
    }

    /// Read and decode every statement
    ///
    /// When `verify` is set and a manifest exists, the checksum and record
    /// count must match it.
    pub fn read_statements(artifact: &Path, verify: bool) -> DurabilityResult<Vec<Statement>> {
        if !artifact.is_file() {
            return Err(DurabilityError::NotFound(artifact.to_path_buf()));
        }
        let data = fs::read(artifact).map_err(|e| DurabilityError::io(artifact, e))?;

        let manifest = if verify {
            Self::read_manifest(artifact)?
        } else {
            None
        };
        if let Some(manifest) = &manifest {
            let actual = xxh3_hex(&data);
            if actual != manifest.checksum {
                return Err(DurabilityError::ChecksumMismatch {
                    path: artifact.to_path_buf(),
                    expected: manifest.checksum.clone(),
                    actual,
                });
            }
        }

        let statements = Self::decode_all(artifact, &data)?;

        if let Some(manifest) = &manifest {
            if manifest.record_count != statements.len() as u64 {
                return Err(DurabilityError::CountMismatch {
                    expected: manifest.record_count,
                    actual: statements.len() as u64,
                });
            }
        }
        Ok(statements)
    }

    /// Read and decode every record, verifying against the manifest
    pub fn read_records(artifact: &Path) -> DurabilityResult<Vec<KvRecord>> {
        Ok(Self::read_statements(artifact, true)?
            .into_iter()
            .map(|s| s.record)
            .collect())
    }

    fn decode_all(artifact: &Path, data: &[u8]) -> DurabilityResult<Vec<Statement>> {
        let malformed = |line: usize, source: Error| DurabilityError::MalformedStatement {
            path: artifact.to_path_buf(),
            line,
            source,
        };

        let mut statements = Vec::new();
        let mut last_id: Option<Revision> = None;
        let mut rest = data;
        let mut line = 0;

        while !rest.is_empty() {
            line += 1;
            let Some(end) = rest.iter().position(|b| *b == b'\n') else {
                return Err(malformed(
                    line,
                    Error::MalformedRecord("last statement is not terminated".to_string()),
                ));
            };
            let raw = &rest[..end];
            rest = &rest[end + 1..];

            let record = decode(raw).map_err(|e| malformed(line, e))?;
            if last_id.map_or(false, |last| record.id <= last) {
                return Err(malformed(
                    line,
                    Error::MalformedRecord(format!("record id {} is out of order", record.id)),
                ));
            }
            last_id = Some(record.id);

            let text = String::from_utf8(raw.to_vec()).map_err(|_| {
                malformed(line, Error::MalformedRecord("statement is not UTF-8".to_string()))
            })?;
            statements.push(Statement { line, text, record });
        }
        Ok(statements)
    }
}
