#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Two-period normalization of XBRL facts.
//!
//! - [`Normalizer`] - Drives one document pass
//! - [`CandidateSelector`] - Picks one fact per canonical key
//! - [`resolve_balance_sheet`] - Balance sheet with anchor-date fallback
//! - [`extract_metadata`] - Filer metadata from the DEI facts
//!
//! # Example
//!
//! ```
//! use xbrl_context::{ContextDefinition, ContextTable};
//! use xbrl_core::{FactValue, FilingInput, RawFact, TaxonomyMapping};
//! use xbrl_normalize::Normalizer;
//!
//! let contexts = ContextTable::from_definitions(vec![ContextDefinition::duration(
//!     "CurrentYearDuration",
//!     "2024-04-01",
//!     "2025-03-31",
//! )]);
//! let input = FilingInput::new(
//!     "S100ABCD",
//!     vec![RawFact::new("jppfs_cor:NetSales", "CurrentYearDuration", "1000000")],
//! );
//! let rules = TaxonomyMapping::default();
//! let doc = Normalizer::new(&rules, &input, &contexts).normalize();
//! assert_eq!(doc.current_year.pl["net_sales"], Some(FactValue::Integer(1_000_000)));
//! ```

/// Balance-sheet anchor fallback.
pub mod anchor;
/// Tag and context-ref predicates.
pub mod matcher;
/// DEI metadata extraction.
pub mod metadata;
/// Document normalizer.
pub mod normalizer;
/// Candidate selection.
pub mod selector;

pub use anchor::{find_anchor_date, merge_missing, resolve_balance_sheet, ANCHOR_KEY, ANCHOR_KEYWORDS};
pub use matcher::{has_member_dimension, is_consolidated_context, local_name, matches};
pub use metadata::{extract_metadata, parse_consolidated_flag, EntityMetadata};
pub use normalizer::Normalizer;
pub use selector::{parse_value, CandidateSelector, ConsolidationPolicy, Target};
