//! Document and entity information extraction.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use xbrl_core::{DeiField, DeiRule, RawFact};

use crate::matcher::{is_consolidated_context, matches};

/// Filer metadata read from the DEI facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Listed security code, trimmed.
    pub security_code: Option<String>,
    /// Filer name.
    pub company_name: Option<String>,
    /// Accounting standard as reported.
    pub accounting_standard: Option<String>,
    /// Whether consolidated statements are prepared. Defaults to true.
    pub is_consolidated: bool,
    /// Fiscal year end, from the fiscal-year-end tag or else the period-end tag.
    pub fiscal_year_end: Option<NaiveDate>,
}

impl Default for EntityMetadata {
    fn default() -> Self {
        Self {
            security_code: None,
            company_name: None,
            accounting_standard: None,
            is_consolidated: true,
            fiscal_year_end: None,
        }
    }
}

/// Extracts metadata for one document.
///
/// For each rule the first fact in a consolidated context wins, else the first
/// non-consolidated one. When several rules feed the same field the later rule
/// overwrites the earlier, and a blank value clears it. The fiscal-year-end tag
/// beats the period-end tag regardless of rule order.
#[must_use]
pub fn extract_metadata(doc_id: &str, facts: &[RawFact], rules: &[DeiRule]) -> EntityMetadata {
    let mut meta = EntityMetadata::default();
    let mut period_end: Option<NaiveDate> = None;
    let mut fiscal_year_end: Option<NaiveDate> = None;

    for rule in rules {
        let Some(fact) = pick_fact(facts, &rule.tag) else {
            if rule.key == DeiField::SecurityCode {
                debug!(doc_id = %doc_id, tag = %rule.tag, "Security code tag not found");
            }
            continue;
        };
        let text = fact.trimmed_value();
        match rule.key {
            DeiField::SecurityCode => meta.security_code = text.map(str::to_string),
            DeiField::CompanyName => meta.company_name = text.map(str::to_string),
            DeiField::AccountingStandard => meta.accounting_standard = text.map(str::to_string),
            DeiField::IsConsolidated => meta.is_consolidated = parse_consolidated_flag(text),
            DeiField::CurrentPeriodEndDate => {
                if period_end.is_none() {
                    period_end = parse_date(text, doc_id);
                }
            }
            DeiField::CurrentFiscalYearEndDate => {
                if let Some(date) = parse_date(text, doc_id) {
                    fiscal_year_end = Some(date);
                }
            }
        }
    }

    meta.fiscal_year_end = fiscal_year_end.or(period_end);

    match &meta.security_code {
        Some(code) => info!(doc_id = %doc_id, security_code = %code, "Extracted security code"),
        None => warn!(doc_id = %doc_id, "Security code could not be extracted"),
    }
    meta
}

/// Parses the consolidation flag: `true`, `1`, `yes` or `有`, case-insensitive.
#[must_use]
pub fn parse_consolidated_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| {
        let v = v.trim().to_lowercase();
        matches!(v.as_str(), "true" | "1" | "yes" | "有")
    })
}

fn pick_fact<'a>(facts: &'a [RawFact], keyword: &str) -> Option<&'a RawFact> {
    let mut fallback = None;
    for fact in facts.iter().filter(|f| matches(&f.tag, keyword)) {
        if is_consolidated_context(&fact.context_ref) {
            return Some(fact);
        }
        if fallback.is_none() {
            fallback = Some(fact);
        }
    }
    fallback
}

fn parse_date(text: Option<&str>, doc_id: &str) -> Option<NaiveDate> {
    let text = text?;
    let head = text.get(..10).unwrap_or(text);
    match NaiveDate::parse_from_str(head, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(doc_id = %doc_id, value = %text, error = %e, "Unparseable DEI date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbrl_core::TaxonomyMapping;

    fn dei_rules() -> Vec<DeiRule> {
        TaxonomyMapping::default().dei
    }

    #[test]
    fn test_extracts_fields() {
        let facts = vec![
            RawFact::new("jpdei_cor:SecurityCodeDEI", "FilingDateInstant", " 72030 "),
            RawFact::new("jpdei_cor:FilerNameInJapaneseDEI", "FilingDateInstant", "トヨタ自動車株式会社"),
            RawFact::new("jpdei_cor:AccountingStandardsDEI", "FilingDateInstant", "IFRS"),
            RawFact::new("jpdei_cor:WhetherConsolidatedFinancialStatementsArePreparedDEI", "FilingDateInstant", "true"),
            RawFact::new("jpdei_cor:CurrentPeriodEndDateDEI", "FilingDateInstant", "2025-03-31"),
        ];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.security_code.as_deref(), Some("72030"));
        assert_eq!(meta.company_name.as_deref(), Some("トヨタ自動車株式会社"));
        assert_eq!(meta.accounting_standard.as_deref(), Some("IFRS"));
        assert!(meta.is_consolidated);
        assert_eq!(meta.fiscal_year_end, NaiveDate::from_ymd_opt(2025, 3, 31));
    }

    #[test]
    fn test_fiscal_year_end_tag_beats_period_end() {
        let facts = vec![
            RawFact::new("jpdei_cor:CurrentPeriodEndDateDEI", "FilingDateInstant", "2025-03-31"),
            RawFact::new("jpdei_cor:CurrentFiscalYearEndDateDEI", "FilingDateInstant", "2025-03-20"),
        ];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.fiscal_year_end, NaiveDate::from_ymd_opt(2025, 3, 20));
    }

    #[test]
    fn test_consolidated_context_preferred() {
        let facts = vec![
            RawFact::new("jpdei_cor:SecurityCodeDEI", "FilingDateInstant_NonConsolidatedMember", "11110"),
            RawFact::new("jpdei_cor:SecurityCodeDEI", "FilingDateInstant", "22220"),
        ];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.security_code.as_deref(), Some("22220"));
    }

    #[test]
    fn test_defaults_when_absent() {
        let meta = extract_metadata("S100TEST", &[], &dei_rules());
        assert_eq!(meta, EntityMetadata::default());
        assert!(meta.is_consolidated);
    }

    #[test]
    fn test_unparseable_date_is_null() {
        let facts = vec![RawFact::new(
            "jpdei_cor:CurrentFiscalYearEndDateDEI",
            "FilingDateInstant",
            "March 2025",
        )];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.fiscal_year_end, None);
    }

    #[test]
    fn test_later_rule_overwrites_field() {
        let facts = vec![
            RawFact::new("jpdei_cor:FilerNameInJapaneseDEI", "FilingDateInstant", "トヨタ自動車株式会社"),
            RawFact::new("jpdei_cor:FilerNameInEnglishDEI", "FilingDateInstant", "TOYOTA MOTOR CORPORATION"),
        ];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.company_name.as_deref(), Some("TOYOTA MOTOR CORPORATION"));
    }

    #[test]
    fn test_blank_later_value_clears_field() {
        let facts = vec![
            RawFact::new("jpdei_cor:FilerNameInJapaneseDEI", "FilingDateInstant", "トヨタ自動車株式会社"),
            RawFact::new("jpdei_cor:FilerNameInEnglishDEI", "FilingDateInstant", "  "),
        ];
        let meta = extract_metadata("S100TEST", &facts, &dei_rules());
        assert_eq!(meta.company_name, None);
    }

    #[test]
    fn test_fiscal_year_end_tag_wins_when_listed_first() {
        let rules = vec![
            DeiRule {
                tag: "CurrentFiscalYearEndDateDEI".into(),
                key: DeiField::CurrentFiscalYearEndDate,
            },
            DeiRule {
                tag: "CurrentPeriodEndDateDEI".into(),
                key: DeiField::CurrentPeriodEndDate,
            },
        ];
        let facts = vec![
            RawFact::new("jpdei_cor:CurrentFiscalYearEndDateDEI", "FilingDateInstant", "2025-03-20"),
            RawFact::new("jpdei_cor:CurrentPeriodEndDateDEI", "FilingDateInstant", "2025-03-31"),
        ];
        let meta = extract_metadata("S100TEST", &facts, &rules);
        assert_eq!(meta.fiscal_year_end, NaiveDate::from_ymd_opt(2025, 3, 20));
    }

    #[test]
    fn test_parse_consolidated_flag() {
        assert!(parse_consolidated_flag(Some("true")));
        assert!(parse_consolidated_flag(Some(" TRUE ")));
        assert!(parse_consolidated_flag(Some("1")));
        assert!(parse_consolidated_flag(Some("Yes")));
        assert!(parse_consolidated_flag(Some("有")));
        assert!(!parse_consolidated_flag(Some("false")));
        assert!(!parse_consolidated_flag(Some("無")));
        assert!(!parse_consolidated_flag(None));
    }
}
