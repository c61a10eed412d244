//! Core types for kinesnap
//!
//! This crate defines the vocabulary shared by every other crate:
//! - [`ResourceCatalog`]: static mapping from bundle file tokens to store paths
//! - [`CapturedObject`], [`StorageKey`], [`KvRecord`]: the translation data model
//! - [`RecordSink`]: the seam records are emitted through
//! - [`Error`]: the translation error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod error;
pub mod traits;
pub mod types;

pub use catalog::{ResourceCatalog, RESOURCE_FILE_EXTENSION};
pub use error::{Error, Result};
pub use traits::RecordSink;
pub use types::{
    CapturedObject, KvRecord, ResourceTypeDescriptor, Revision, RevisionTriple, StorageKey,
    REGISTRY_PREFIX,
};
