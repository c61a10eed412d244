//! Support bundle extraction
//!
//! Captures arrive as gzip-compressed tarballs that may themselves contain
//! further gzip tarballs (one per node or component). Extraction unpacks the
//! outer archive into a per-ticket bundle directory and then flattens the
//! nested ones next to it:
//!
//! ```text
//! <tickets_dir>/<ticket>/bundle-<stem>/
//! ├── api-resources/...
//! ├── pods_logs/...
//! └── <nested archive name>/...
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod extractor;

pub use error::{ArchiveError, ArchiveResult};
pub use extractor::{
    bundle_dir_name, is_gzip, BundleExtractor, ExtractReport, BUNDLE_DIR_PREFIX, GZIP_MAGIC,
    NESTED_BUNDLES_DIR,
};
