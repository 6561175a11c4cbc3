#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/xbrl/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! XBRL context table and fiscal period resolution.
//!
//! - [`ContextTable`] - Context id to instant/duration period
//! - [`FiscalPeriod`] - Current and prior fiscal year-end dates
//!
//! # Example
//!
//! ```
//! use xbrl_context::{ContextDefinition, ContextTable, FiscalPeriod};
//!
//! let table = ContextTable::from_definitions(vec![
//!     ContextDefinition::duration("CurrentYearDuration", "2024-04-01", "2025-03-31"),
//!     ContextDefinition::duration("Prior1YearDuration", "2023-04-01", "2024-03-31"),
//! ]);
//! let fiscal = FiscalPeriod::resolve(&table);
//! assert_eq!(fiscal.current_year_end.unwrap().to_string(), "2025-03-31");
//! ```

/// Context classification and the context table.
pub mod context;
/// Fiscal year-end derivation.
pub mod fiscal;

pub use context::{Context, ContextDefinition, ContextTable, XBRLI_NS};
pub use fiscal::FiscalPeriod;
