#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Normalization pipeline for XBRL financial filings.
//!
//! This crate re-exports the core types and ties the workspace crates together
//! behind a [`Pipeline`]: normalize a filing, check its identifiers, compute
//! its canonical facts, and optionally run many filings concurrently into a
//! [`FactStore`].
//!
//! # Features
//!
//! - `xml` - Build filings from XBRL instance documents (default)
//!
//! # Example
//!
//! ```rust,ignore
//! use xbrl::{BatchOptions, Filing, InMemoryFactStore, Pipeline};
//!
//! #[tokio::main]
//! async fn main() -> xbrl::Result<()> {
//!     let pipeline = Pipeline::default();
//!     let xml = std::fs::read_to_string("instance.xbrl")
//!         .map_err(|e| xbrl::NormalizeError::Other(e.to_string()))?;
//!     let filing = Filing::parse_instance("S100ABCD", &xml)?;
//!
//!     let store = InMemoryFactStore::new();
//!     let report = pipeline
//!         .run_batch(vec![filing], &store, BatchOptions::default())
//!         .await?;
//!     println!("{report:?}");
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use xbrl_core::*;

pub use xbrl_context::{ContextDefinition, ContextTable, FiscalPeriod};
pub use xbrl_facts::{FactMaster, PriorityEngine};
pub use xbrl_normalize::{EntityMetadata, Normalizer};
pub use xbrl_store::{InMemoryFactStore, NoopFactStore};

mod batch;
mod filing;
mod pipeline;

pub use batch::{BatchIssue, BatchOptions, BatchReport};
pub use filing::Filing;
pub use pipeline::{Outcome, Pipeline};
