#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and rule tables for XBRL fact normalization.
//!
//! This crate provides the foundations shared by the normalization crates:
//!
//! - [`RawFact`](types::RawFact) - A tagged value from the upstream parser
//! - [`NormalizedDocument`](types::NormalizedDocument) - Two-period normalizer output
//! - [`FactSet`](types::FactSet) - Canonical facts after synonym resolution
//! - [`RuleSet`](config::RuleSet) - Tag-to-key and resolution tables
//! - [`FactStore`](store::FactStore) - Storage abstraction for fact sets

/// Rule tables and their EDINET defaults.
pub mod config;
/// Error types for normalization.
pub mod error;
/// Period and section definitions.
pub mod period;
/// Store trait for fact sets.
pub mod store;
/// Core data types (RawFact, NormalizedDocument, FactSet, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use config::{CanonicalKeys, DeiField, DeiRule, FactKeySpec, RuleSet, TagRule, TaxonomyMapping};
pub use error::{NormalizeError, Result};
pub use period::{ContextKind, Period, Section, ValueKind};
pub use store::FactStore;
pub use types::{
    ConsolidationType, FactSet, FactValue, FactYear, FilingInput, NormalizedDocument,
    NormalizedYearBlock, PeriodRange, RawFact, ReportType, SectionValues,
};
