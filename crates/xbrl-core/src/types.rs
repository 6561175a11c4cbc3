//! Core data types for XBRL fact normalization.
//!
//! This module defines the data flowing through the pipeline:
//!
//! - [`RawFact`] / [`FilingInput`] - tagged values as produced by the upstream parser
//! - [`FactValue`] - a parsed numeric value
//! - [`NormalizedYearBlock`] / [`NormalizedDocument`] - normalizer output
//! - [`FactYear`] / [`FactSet`] - canonical facts after synonym resolution

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{NormalizeError, Result};

/// A single tagged fact element from an instance document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFact {
    /// Qualified tag name, e.g. `jppfs_cor:NetSales`.
    pub tag: String,
    /// Id of the context the fact is reported against.
    pub context_ref: String,
    /// Text content, `None` when the element was empty.
    pub value: Option<String>,
    /// True when the element carried `xsi:nil="true"`.
    #[serde(default)]
    pub is_nil: bool,
}

impl RawFact {
    /// Creates a fact with a text value.
    #[must_use]
    pub fn new(
        tag: impl Into<String>,
        context_ref: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            tag: tag.into(),
            context_ref: context_ref.into(),
            value: Some(value.into()),
            is_nil: false,
        }
    }

    /// Creates an explicit nil fact.
    #[must_use]
    pub fn nil(tag: impl Into<String>, context_ref: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            context_ref: context_ref.into(),
            value: None,
            is_nil: true,
        }
    }

    /// Returns the trimmed value, or `None` when it is absent or blank.
    #[must_use]
    pub fn trimmed_value(&self) -> Option<&str> {
        self.value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }
}

/// Everything the upstream parser hands over for one filing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingInput {
    /// Document identifier.
    pub doc_id: String,
    /// Taxonomy version the filing was prepared against.
    pub taxonomy_version: Option<String>,
    /// All facts of the document.
    pub facts: Vec<RawFact>,
}

impl FilingInput {
    /// Creates a filing input from a document id and its facts.
    #[must_use]
    pub fn new(doc_id: impl Into<String>, facts: Vec<RawFact>) -> Self {
        Self {
            doc_id: doc_id.into(),
            taxonomy_version: None,
            facts,
        }
    }

    /// Sets the taxonomy version.
    #[must_use]
    pub fn with_taxonomy_version(mut self, version: impl Into<String>) -> Self {
        self.taxonomy_version = Some(version.into());
        self
    }
}

/// A parsed numeric fact value.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    /// Whole amount or count.
    Integer(i64),
    /// Fractional amount.
    Decimal(f64),
}

impl FactValue {
    /// Returns the value as a float.
    #[must_use]
    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Integer(v) => v as f64,
            Self::Decimal(v) => v,
        }
    }

    /// Returns the value as an integer, truncating fractions.
    ///
    /// Returns `None` for non-finite decimals.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Integer(v) => Some(v),
            Self::Decimal(v) if v.is_finite() => Some(v.trunc() as i64),
            Self::Decimal(_) => None,
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
        }
    }
}

/// Canonical key to value (or null) for one statement section.
pub type SectionValues = BTreeMap<String, Option<FactValue>>;

/// Start and end of a fiscal year.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodRange {
    /// First day of the period.
    pub start: NaiveDate,
    /// Last day of the period.
    pub end: NaiveDate,
}

/// Normalized statements for one fiscal year.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedYearBlock {
    /// Income statement.
    pub pl: SectionValues,
    /// Balance sheet, including issued share counts.
    pub bs: SectionValues,
    /// Cash flow statement.
    pub cf: SectionValues,
    /// Dividends.
    pub dividend: SectionValues,
    /// Reporting period, absent when no matching duration context exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodRange>,
}

impl NormalizedYearBlock {
    /// Merges all sections into one map, later sections overriding earlier
    /// ones on key collisions (pl, bs, cf, dividend).
    #[must_use]
    pub fn merged(&self) -> SectionValues {
        let mut all = self.pl.clone();
        for section in [&self.bs, &self.cf, &self.dividend] {
            all.extend(section.iter().map(|(k, v)| (k.clone(), *v)));
        }
        all
    }
}

/// Consolidation basis of a filing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationType {
    /// Group-level statements.
    #[default]
    Consolidated,
    /// Parent-only statements.
    NonConsolidated,
}

impl From<bool> for ConsolidationType {
    fn from(is_consolidated: bool) -> Self {
        if is_consolidated {
            Self::Consolidated
        } else {
            Self::NonConsolidated
        }
    }
}

/// Kind of report a filing is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// Annual securities report.
    #[default]
    Annual,
}

/// Normalized two-period view of one filing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedDocument {
    /// Document identifier.
    pub doc_id: String,
    /// Security code as reported.
    pub security_code: Option<String>,
    /// Filer name.
    pub company_name: Option<String>,
    /// Accounting standard as reported.
    pub accounting_standard: Option<String>,
    /// Whether the filing declares consolidated statements.
    pub is_consolidated: bool,
    /// Consolidation basis derived from `is_consolidated`.
    pub consolidation_type: ConsolidationType,
    /// Fiscal year end declared in the entity information.
    pub fiscal_year_end: Option<NaiveDate>,
    /// Report type.
    pub report_type: ReportType,
    /// Current fiscal year.
    pub current_year: NormalizedYearBlock,
    /// Prior fiscal year.
    pub prior_year: NormalizedYearBlock,
}

impl NormalizedDocument {
    /// Checks that the document carries the identifiers needed downstream.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::MissingSecurityCode`] or
    /// [`NormalizeError::MissingFiscalYearEnd`].
    pub fn ensure_usable(&self) -> Result<()> {
        if self.security_code.is_none() {
            return Err(NormalizeError::MissingSecurityCode {
                doc_id: self.doc_id.clone(),
            });
        }
        if self.fiscal_year_end.is_none() {
            return Err(NormalizeError::MissingFiscalYearEnd {
                doc_id: self.doc_id.clone(),
            });
        }
        Ok(())
    }
}

/// Canonical facts for one fiscal year.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactYear {
    /// Canonical key to value (or null).
    pub metrics: SectionValues,
    /// Reporting period.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<PeriodRange>,
}

impl FactYear {
    /// Returns the number of non-null facts.
    #[must_use]
    pub fn present_count(&self) -> usize {
        self.metrics.values().filter(|v| v.is_some()).count()
    }

    /// Returns a fact value by canonical key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<FactValue> {
        self.metrics.get(key).copied().flatten()
    }
}

/// Canonical fact set of one filing.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FactSet {
    /// Document identifier.
    pub doc_id: String,
    /// Normalized security code.
    pub security_code: Option<String>,
    /// Fiscal year end.
    pub fiscal_year_end: Option<NaiveDate>,
    /// Report type.
    pub report_type: ReportType,
    /// Consolidation basis.
    pub consolidation_type: ConsolidationType,
    /// Normalized accounting standard.
    pub accounting_standard: Option<String>,
    /// Current year facts, absent when every value is null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_year: Option<FactYear>,
    /// Prior year facts, absent when every value is null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prior_year: Option<FactYear>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trimmed_value() {
        assert_eq!(RawFact::new("a", "c", " 42 ").trimmed_value(), Some("42"));
        assert_eq!(RawFact::new("a", "c", "   ").trimmed_value(), None);
        assert_eq!(RawFact::nil("a", "c").trimmed_value(), None);
    }

    #[test]
    fn test_fact_value_serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&FactValue::Integer(7)).unwrap(), "7");
        assert_eq!(
            serde_json::to_string(&FactValue::Decimal(12.5)).unwrap(),
            "12.5"
        );
        assert_eq!(FactValue::Decimal(3.9).as_i64(), Some(3));
        assert_eq!(FactValue::Decimal(f64::NAN).as_i64(), None);
    }

    #[test]
    fn test_merged_prefers_later_sections() {
        let mut block = NormalizedYearBlock::default();
        block.pl.insert("x".into(), Some(FactValue::Integer(1)));
        block.bs.insert("x".into(), None);
        block.dividend.insert("d".into(), Some(FactValue::Decimal(2.0)));
        let merged = block.merged();
        assert_eq!(merged.get("x"), Some(&None));
        assert_eq!(merged.get("d"), Some(&Some(FactValue::Decimal(2.0))));
    }

    #[test]
    fn test_ensure_usable() {
        let mut doc = NormalizedDocument {
            doc_id: "S100TEST".into(),
            ..Default::default()
        };
        assert!(matches!(
            doc.ensure_usable(),
            Err(NormalizeError::MissingSecurityCode { .. })
        ));
        doc.security_code = Some("72030".into());
        assert!(matches!(
            doc.ensure_usable(),
            Err(NormalizeError::MissingFiscalYearEnd { .. })
        ));
        doc.fiscal_year_end = NaiveDate::from_ymd_opt(2025, 3, 31);
        assert!(doc.ensure_usable().is_ok());
    }

    #[test]
    fn test_consolidation_type_from_flag() {
        assert_eq!(
            ConsolidationType::from(true),
            ConsolidationType::Consolidated
        );
        assert_eq!(
            serde_json::to_string(&ConsolidationType::from(false)).unwrap(),
            "\"non_consolidated\""
        );
    }
}
