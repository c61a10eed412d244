//! Replay Test Suite
//!
//! End-to-end tests from a bundle directory to rows in a store file.
//!
//! ## Modules
//!
//! - `common`: bundle fixtures
//! - `translate`: keys, exclusions, ordering and escaping of translated records
//! - `load`: artifact files loaded into SQLite
//! - `properties`: property tests over generated bundles

mod common;
mod load;
mod properties;
mod translate;
