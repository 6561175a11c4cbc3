//! Balance-sheet anchor fallback.
//!
//! Some filers report the balance sheet at an instant that is not the fiscal
//! year-end implied by the duration contexts. When the primary instant lookup
//! finds no total assets, the date most balance-sheet totals are reported at
//! is used instead, filling only keys that are still null.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{debug, info};

use xbrl_core::{ContextKind, SectionValues, TagRule, ValueKind};

use crate::matcher::{has_member_dimension, is_consolidated_context, local_name};
use crate::selector::{CandidateSelector, ConsolidationPolicy, Target};

/// Tag fragments identifying balance-sheet totals.
pub const ANCHOR_KEYWORDS: &[&str] = &["TotalAssets", "LiabilitiesAndNetAssets", "NetAssets"];

/// Key whose absence triggers the fallback.
pub const ANCHOR_KEY: &str = "total_assets";

/// Finds the instant date carrying the most balance-sheet totals.
///
/// Only non-dimensional, non-nil facts with a value are counted; consolidated
/// only when the policy says so. Ties go to the earliest date.
#[must_use]
pub fn find_anchor_date(
    selector: &CandidateSelector<'_>,
    policy: ConsolidationPolicy,
) -> Option<NaiveDate> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for fact in selector.facts() {
        if fact.is_nil || fact.trimmed_value().is_none() {
            continue;
        }
        let name = local_name(&fact.tag);
        if !ANCHOR_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            continue;
        }
        if has_member_dimension(&fact.context_ref) {
            continue;
        }
        if !policy.allows_non_consolidated() && !is_consolidated_context(&fact.context_ref) {
            continue;
        }
        let Some(ctx) = selector.contexts().get(&fact.context_ref) else {
            continue;
        };
        if ctx.kind() == ContextKind::Instant {
            *counts.entry(ctx.reference_date()).or_default() += 1;
        }
    }

    // BTreeMap iterates in date order; max_by keeps the last maximum, so
    // compare with reversed dates to prefer the earliest.
    counts
        .into_iter()
        .max_by(|(da, ca), (db, cb)| ca.cmp(cb).then_with(|| db.cmp(da)))
        .map(|(date, count)| {
            debug!(anchor = %date, count, "Anchor date candidate");
            date
        })
}

/// Copies values from `fallback` into keys of `primary` that are missing or
/// null. Non-null values in `primary` are never touched.
pub fn merge_missing(primary: &mut SectionValues, fallback: SectionValues) {
    for (key, value) in fallback {
        let slot = primary.entry(key).or_insert(None);
        if slot.is_none() {
            *slot = value;
        }
    }
}

/// Extracts the balance sheet at `date`, falling back to the anchor date when
/// total assets are not found there.
///
/// With no target date the fallback is skipped, so one year's figures never
/// leak into a year the filing does not report.
#[must_use]
pub fn resolve_balance_sheet(
    selector: &CandidateSelector<'_>,
    rules: &[TagRule],
    date: Option<NaiveDate>,
    policy: ConsolidationPolicy,
) -> SectionValues {
    let target = Target {
        kind: ContextKind::Instant,
        date,
        policy,
        value_kind: ValueKind::Integer,
    };
    let mut values = selector.select(rules, target);

    let Some(date) = date else {
        return values;
    };
    if values.get(ANCHOR_KEY).copied().flatten().is_some() {
        return values;
    }
    let Some(anchor) = find_anchor_date(selector, policy) else {
        return values;
    };
    if anchor == date {
        return values;
    }

    info!(target_date = %date, anchor = %anchor, "Total assets missing, using anchor date");
    let fallback = selector.select(
        rules,
        Target {
            date: Some(anchor),
            ..target
        },
    );
    merge_missing(&mut values, fallback);
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbrl_context::{ContextDefinition, ContextTable};
    use xbrl_core::{FactValue, RawFact};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bs_rules() -> Vec<TagRule> {
        vec![
            TagRule::new("TotalAssets", "total_assets"),
            TagRule::new("NetAssets", "net_assets"),
            TagRule::new("CashAndDeposits", "cash_and_deposits"),
        ]
    }

    fn shifted_filing() -> (Vec<RawFact>, ContextTable) {
        let contexts = ContextTable::from_definitions(vec![
            ContextDefinition::duration("CurrentYearDuration", "2024-03-21", "2025-03-31"),
            ContextDefinition::instant("CurrentYearInstant", "2025-03-20"),
            ContextDefinition::instant("Prior1YearInstant", "2024-03-20"),
        ]);
        let facts = vec![
            RawFact::new("jppfs_cor:TotalAssets", "CurrentYearInstant", "5000"),
            RawFact::new("jppfs_cor:NetAssets", "CurrentYearInstant", "2000"),
            RawFact::new("jppfs_cor:LiabilitiesAndNetAssets", "CurrentYearInstant", "5000"),
            RawFact::new("jppfs_cor:TotalAssets", "Prior1YearInstant", "4500"),
        ];
        (facts, contexts)
    }

    #[test]
    fn test_anchor_date_majority() {
        let (facts, contexts) = shifted_filing();
        let selector = CandidateSelector::new(&facts, &contexts);
        let anchor = find_anchor_date(&selector, ConsolidationPolicy::PreferConsolidated);
        assert_eq!(anchor, Some(date(2025, 3, 20)));
    }

    #[test]
    fn test_anchor_tie_prefers_earliest() {
        let contexts = ContextTable::from_definitions(vec![
            ContextDefinition::instant("A", "2025-03-31"),
            ContextDefinition::instant("B", "2025-03-20"),
        ]);
        let facts = vec![
            RawFact::new("jppfs_cor:TotalAssets", "A", "1"),
            RawFact::new("jppfs_cor:TotalAssets", "B", "1"),
        ];
        let selector = CandidateSelector::new(&facts, &contexts);
        let anchor = find_anchor_date(&selector, ConsolidationPolicy::PreferConsolidated);
        assert_eq!(anchor, Some(date(2025, 3, 20)));
    }

    #[test]
    fn test_anchor_ignores_nil_dimensional_and_non_consolidated() {
        let contexts = ContextTable::from_definitions(vec![
            ContextDefinition::instant("A", "2025-03-31"),
            ContextDefinition::instant("A_NonConsolidatedMember", "2025-03-20"),
            ContextDefinition::instant("A_SegmentMember", "2025-03-10"),
        ]);
        let facts = vec![
            RawFact::new("jppfs_cor:TotalAssets", "A", "1"),
            RawFact::new("jppfs_cor:TotalAssets", "A_NonConsolidatedMember", "1"),
            RawFact::new("jppfs_cor:NetAssets", "A_NonConsolidatedMember", "1"),
            RawFact::new("jppfs_cor:TotalAssets", "A_SegmentMember", "1"),
            RawFact::new("jppfs_cor:NetAssets", "A_SegmentMember", "1"),
            RawFact::nil("jppfs_cor:NetAssets", "A_SegmentMember"),
        ];
        let selector = CandidateSelector::new(&facts, &contexts);
        assert_eq!(
            find_anchor_date(&selector, ConsolidationPolicy::ConsolidatedOnly),
            Some(date(2025, 3, 31))
        );
        assert_eq!(
            find_anchor_date(&selector, ConsolidationPolicy::PreferConsolidated),
            Some(date(2025, 3, 20))
        );
    }

    #[test]
    fn test_fallback_fills_total_assets() {
        let (facts, contexts) = shifted_filing();
        let selector = CandidateSelector::new(&facts, &contexts);
        let bs = resolve_balance_sheet(
            &selector,
            &bs_rules(),
            Some(date(2025, 3, 31)),
            ConsolidationPolicy::PreferConsolidated,
        );
        assert_eq!(bs["total_assets"], Some(FactValue::Integer(5000)));
        assert_eq!(bs["net_assets"], Some(FactValue::Integer(2000)));
        assert_eq!(bs["cash_and_deposits"], None);
    }

    #[test]
    fn test_fallback_skipped_without_target() {
        let (facts, contexts) = shifted_filing();
        let selector = CandidateSelector::new(&facts, &contexts);
        let bs = resolve_balance_sheet(
            &selector,
            &bs_rules(),
            None,
            ConsolidationPolicy::PreferConsolidated,
        );
        assert!(bs.values().all(Option::is_none));
    }

    #[test]
    fn test_fallback_is_idempotent_when_total_assets_found() {
        let contexts = ContextTable::from_definitions(vec![
            ContextDefinition::instant("CurrentYearInstant", "2025-03-31"),
            ContextDefinition::instant("Other", "2025-03-20"),
        ]);
        let facts = vec![
            RawFact::new("jppfs_cor:TotalAssets", "CurrentYearInstant", "100"),
            RawFact::new("jppfs_cor:TotalAssets", "Other", "900"),
            RawFact::new("jppfs_cor:NetAssets", "Other", "800"),
            RawFact::new("jppfs_cor:LiabilitiesAndNetAssets", "Other", "900"),
        ];
        let selector = CandidateSelector::new(&facts, &contexts);
        let target = Target {
            kind: ContextKind::Instant,
            date: Some(date(2025, 3, 31)),
            policy: ConsolidationPolicy::PreferConsolidated,
            value_kind: ValueKind::Integer,
        };
        let plain = selector.select(&bs_rules(), target);
        let anchored = resolve_balance_sheet(
            &selector,
            &bs_rules(),
            Some(date(2025, 3, 31)),
            ConsolidationPolicy::PreferConsolidated,
        );
        assert_eq!(plain, anchored);
        assert_eq!(anchored["net_assets"], None);
    }

    #[test]
    fn test_merge_missing_never_overwrites() {
        let mut primary = SectionValues::new();
        primary.insert("net_assets".into(), Some(FactValue::Integer(1)));
        primary.insert("total_assets".into(), None);
        let mut fallback = SectionValues::new();
        fallback.insert("net_assets".into(), Some(FactValue::Integer(2)));
        fallback.insert("total_assets".into(), Some(FactValue::Integer(3)));
        fallback.insert("cash_and_deposits".into(), None);

        merge_missing(&mut primary, fallback);
        assert_eq!(primary["net_assets"], Some(FactValue::Integer(1)));
        assert_eq!(primary["total_assets"], Some(FactValue::Integer(3)));
        assert_eq!(primary["cash_and_deposits"], None);
    }
}
