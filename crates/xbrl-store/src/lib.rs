#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Fact store implementations.
//!
//! This crate provides implementations of the [`FactStore`] trait from `xbrl-core`:
//!
//! - [`InMemoryFactStore`] - In-memory store for tests and single-run batches
//! - [`NoopFactStore`] - Store that keeps nothing

/// In-memory store implementation.
pub mod memory;
/// No-op store implementation.
pub mod noop;

// Re-export the trait for convenience
pub use xbrl_core::FactStore;

pub use memory::InMemoryFactStore;
pub use noop::NoopFactStore;
