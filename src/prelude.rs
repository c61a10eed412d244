//! Convenient imports for kinesnap.
//!
//! ```ignore
//! use kinesnap::prelude::*;
//!
//! let bundle = Bundle::open(".")?;
//! let (records, report) = bundle.records(TranslateOptions::default())?;
//! ```

// Main entry point
pub use crate::bundle::Bundle;

// Error handling
pub use crate::error::{Error, Result};

// Records
pub use kinesnap_core::{KvRecord, RecordSink, ResourceCatalog, Revision, StorageKey};

// Translation
pub use kinesnap_translate::{TranslateOptions, TranslationEvent, TranslationReport, Translator};

// Artifact and store
pub use kinesnap_durability::{
    ArtifactManifest, ArtifactReader, ArtifactWriter, LoadOptions, LoadReport, SnapshotLoader,
};

// Collaborators
pub use kinesnap_archive::{BundleExtractor, ExtractReport};
pub use kinesnap_cluster::{
    CommandRunner, DownReport, K3dCluster, PodLogEntry, PodLogIndex, Replay, ReplayLayout,
    SystemRunner, UpReport,
};
