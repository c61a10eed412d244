//! # kinesnap
//!
//! Replay a captured Kubernetes support bundle into a disposable,
//! kine-backed cluster.
//!
//! A bundle holds one YAML file per resource type under `api-resources/`.
//! kinesnap turns every captured object into a row of the kine table, writes
//! those rows as an ordered artifact of insert statements, and loads the
//! artifact into the store file of a single-node k3s server so the captured
//! state can be browsed with ordinary tooling.
//!
//! ## Quick Start
//!
//! ```ignore
//! use kinesnap::prelude::*;
//!
//! let bundle = Bundle::open("/tickets/17096/bundle-20200211T002751")?;
//!
//! // Translate only
//! let (report, manifest) = bundle.translate_to(
//!     Path::new("snapshot.sql"),
//!     TranslateOptions::default(),
//!     &mut |event| println!("{:?}", event),
//! )?;
//!
//! // Full replay
//! let mut runner = SystemRunner;
//! bundle.up(&mut runner, TranslateOptions::default(), &mut |_| {})?;
//! ```
//!
//! ## Crates
//!
//! - `kinesnap-core`: records, keys, the resource catalog and the error taxonomy
//! - `kinesnap-translate`: scan, normalize, allocate, emit
//! - `kinesnap-durability`: the artifact file, its manifest and the store loader
//! - `kinesnap-archive`: support bundle extraction
//! - `kinesnap-cluster`: k3d lifecycle, replay orchestration, pod logs

#![warn(missing_docs)]

mod bundle;
mod error;

pub mod prelude;

pub use bundle::Bundle;
pub use error::{Error, Result};

pub use kinesnap_archive as archive;
pub use kinesnap_cluster as cluster;
pub use kinesnap_durability as durability;
pub use kinesnap_translate as translate;
