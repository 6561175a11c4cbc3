#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Canonical fact resolution.
//!
//! - [`FactMaster`] - Normalized document to canonical [`FactSet`](xbrl_core::FactSet)
//! - [`PriorityEngine`] - First non-null value among synonym keys

/// Fact set construction.
pub mod master;
/// Priority resolution.
pub mod priority;
/// Code and standard normalization.
pub mod standard;

pub use master::FactMaster;
pub use priority::{resolve_by_priority, PriorityEngine};
pub use standard::{normalize_accounting_standard, normalize_security_code};
