//! Durability layer for kinesnap
//!
//! This crate owns everything that touches the snapshot artifact on disk:
//! - Artifact: append-only statement file, one complete record per line
//! - Manifest: record count, id range and xxh3 checksum of the artifact
//! - Loader: applies an artifact to the store's SQLite file in one transaction

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod artifact;
pub mod error;
pub mod loader;
pub mod manifest;

pub use artifact::{ArtifactReader, ArtifactWriter, Statement};
pub use error::{DurabilityError, DurabilityResult};
pub use loader::{LoadOptions, LoadReport, SnapshotLoader, KINE_SCHEMA};
pub use manifest::{manifest_path, xxh3_hex, ArtifactManifest, ARTIFACT_FORMAT_VERSION};
