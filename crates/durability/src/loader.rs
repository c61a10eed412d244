//! Applies a snapshot artifact to the store's SQLite file
//!
//! Loading is all-or-nothing. Every statement is decoded before anything is
//! executed, then the verbatim statements run inside one transaction. A
//! failure at any point leaves the store file as it was.

use crate::artifact::{ArtifactReader, Statement};
use crate::error::{DurabilityError, DurabilityResult};
use kinesnap_core::Revision;
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

/// Table and indexes the store expects
pub const KINE_SCHEMA: &str = "\
CREATE TABLE IF NOT EXISTS kine (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name INTEGER,
    created INTEGER,
    deleted INTEGER,
    create_revision INTEGER,
    prev_revision INTEGER,
    lease INTEGER,
    value BLOB,
    old_value BLOB
);
CREATE INDEX IF NOT EXISTS kine_name_index ON kine (name);
CREATE INDEX IF NOT EXISTS kine_name_id_index ON kine (name, id);
CREATE INDEX IF NOT EXISTS kine_id_deleted_index ON kine (id, deleted);
CREATE INDEX IF NOT EXISTS kine_prev_revision_index ON kine (prev_revision);
CREATE UNIQUE INDEX IF NOT EXISTS kine_name_prev_revision_uindex ON kine (name, prev_revision);
";

/// Options for [`SnapshotLoader`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Create the kine table and indexes when missing
    pub create_table: bool,
    /// Check the artifact against its manifest, when there is one
    pub verify_checksum: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            create_table: false,
            verify_checksum: true,
        }
    }
}

impl LoadOptions {
    /// Set whether to create the table
    pub fn create_table(mut self, create_table: bool) -> Self {
        self.create_table = create_table;
        self
    }

    /// Set whether to verify the manifest checksum
    pub fn verify_checksum(mut self, verify_checksum: bool) -> Self {
        self.verify_checksum = verify_checksum;
        self
    }
}

/// Result of a successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    /// Statements executed
    pub statements_applied: usize,
    /// Id of the first record loaded
    pub first_id: Option<Revision>,
    /// Id of the last record loaded
    pub last_id: Option<Revision>,
}

/// Loads artifacts into a store file
pub struct SnapshotLoader;

impl SnapshotLoader {
    /// Load `artifact` into the SQLite file at `db_path`
    pub fn load(artifact: &Path, db_path: &Path, opts: LoadOptions) -> DurabilityResult<LoadReport> {
        let statements = ArtifactReader::read_statements(artifact, opts.verify_checksum)?;

        if !opts.create_table && !db_path.is_file() {
            return Err(DurabilityError::NotFound(db_path.to_path_buf()));
        }
        let mut conn = Connection::open(db_path)?;
        info!(
            "Loading {} statements from {} into {}",
            statements.len(),
            artifact.display(),
            db_path.display()
        );
        Self::apply(&mut conn, &statements, opts)
    }

    /// Load `artifact` through an already open connection
    pub fn load_into(
        conn: &mut Connection,
        artifact: &Path,
        opts: LoadOptions,
    ) -> DurabilityResult<LoadReport> {
        let statements = ArtifactReader::read_statements(artifact, opts.verify_checksum)?;
        Self::apply(conn, &statements, opts)
    }

    fn apply(
        conn: &mut Connection,
        statements: &[Statement],
        opts: LoadOptions,
    ) -> DurabilityResult<LoadReport> {
        let tx = conn.transaction()?;
        if opts.create_table {
            tx.execute_batch(KINE_SCHEMA)?;
        }
        for statement in statements {
            tx.execute(&statement.text, ())?;
        }
        tx.commit()?;

        let report = LoadReport {
            statements_applied: statements.len(),
            first_id: statements.first().map(|s| s.record.id),
            last_id: statements.last().map(|s| s.record.id),
        };
        debug!(?report, "Snapshot loaded");
        Ok(report)
    }
}
