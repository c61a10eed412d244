//! Bundle-to-kine translation
//!
//! This crate turns the per-resource YAML files of a support bundle into
//! kine table rows:
//! - scanner: find resource files in deterministic order
//! - normalizer: parse objects and produce their canonical bytes
//! - allocator: storage keys and revision identities
//! - emitter: render rows as insert statements and decode them back
//! - translator: the pipeline driving all of the above

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod allocator;
pub mod emitter;
pub mod normalizer;
pub mod scanner;
pub mod translator;

pub use allocator::{Allocation, RevisionAllocator, DEFAULT_START_REVISION, DEFAULT_STRIDE, MIN_STRIDE};
pub use emitter::{decode, emit, escape_literal, unescape_literal, INSERT_PREFIX};
pub use normalizer::{canonical_json, normalize};
pub use scanner::{BundleScanner, ResourceFile, ScanResult, RESOURCE_DIR_NAME};
pub use translator::{TranslateOptions, TranslationEvent, TranslationReport, Translator};
