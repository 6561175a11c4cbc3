//! Candidate selection for one statement section and target date.
//!
//! For every rule of a section the selector gathers the facts whose tag
//! matches, drops dimensional contexts and contexts at other dates, then picks
//! one winner, consolidated first.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use xbrl_context::ContextTable;
use xbrl_core::{ContextKind, FactValue, RawFact, SectionValues, TagRule, ValueKind};

use crate::matcher::{has_member_dimension, is_consolidated_context, matches};

/// Whether standalone figures may stand in for missing consolidated ones.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationPolicy {
    /// Prefer consolidated candidates, fall back to non-consolidated.
    #[default]
    PreferConsolidated,
    /// Only consolidated candidates can win.
    ConsolidatedOnly,
}

impl ConsolidationPolicy {
    /// Maps a consolidated-only flag to a policy.
    #[must_use]
    pub const fn from_consolidated_only(consolidated_only: bool) -> Self {
        if consolidated_only {
            Self::ConsolidatedOnly
        } else {
            Self::PreferConsolidated
        }
    }

    /// Returns true if non-consolidated candidates are eligible.
    #[must_use]
    pub const fn allows_non_consolidated(&self) -> bool {
        matches!(self, Self::PreferConsolidated)
    }
}

/// Where and how a section is looked up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Target {
    /// Kind of context the facts must be reported against.
    pub kind: ContextKind,
    /// Instant date or duration end date. `None` yields an all-null section.
    pub date: Option<NaiveDate>,
    /// Consolidation policy.
    pub policy: ConsolidationPolicy,
    /// How winning values are parsed.
    pub value_kind: ValueKind,
}

/// Picks one fact per canonical key from a document's facts.
#[derive(Clone, Copy, Debug)]
pub struct CandidateSelector<'a> {
    facts: &'a [RawFact],
    contexts: &'a ContextTable,
}

impl<'a> CandidateSelector<'a> {
    /// Creates a selector over a document's facts and context table.
    #[must_use]
    pub const fn new(facts: &'a [RawFact], contexts: &'a ContextTable) -> Self {
        Self { facts, contexts }
    }

    /// Returns the document's facts.
    #[must_use]
    pub const fn facts(&self) -> &'a [RawFact] {
        self.facts
    }

    /// Returns the document's context table.
    #[must_use]
    pub const fn contexts(&self) -> &'a ContextTable {
        self.contexts
    }

    /// Resolves every key of `rules` at `target`.
    ///
    /// The result holds each rule's key exactly once. Rules are tried in
    /// order; a key stays open until a rule yields a parsed value or a nil
    /// fact. A nil winner resolves its key to null, so later rules for the same
    /// key are never consulted.
    #[must_use]
    pub fn select(&self, rules: &[TagRule], target: Target) -> SectionValues {
        let mut out = SectionValues::new();
        let Some(date) = target.date else {
            for rule in rules {
                out.entry(rule.key.clone()).or_insert(None);
            }
            return out;
        };

        let mut resolved: HashSet<&str> = HashSet::new();
        for rule in rules {
            if resolved.contains(rule.key.as_str()) {
                continue;
            }
            match self.choose(&rule.tag, target.kind, date, target.policy) {
                Some(fact) => {
                    let parsed = parse_value(fact, target.value_kind);
                    out.insert(rule.key.clone(), parsed);
                    if parsed.is_some() || fact.is_nil {
                        trace!(key = %rule.key, tag = %rule.tag, nil = fact.is_nil, "Resolved key");
                        resolved.insert(rule.key.as_str());
                    }
                }
                None => {
                    out.entry(rule.key.clone()).or_insert(None);
                }
            }
        }
        out
    }

    /// Picks the winning fact for one keyword: the first consolidated
    /// candidate, else the first non-consolidated one when the policy allows.
    #[must_use]
    pub fn choose(
        &self,
        keyword: &str,
        kind: ContextKind,
        date: NaiveDate,
        policy: ConsolidationPolicy,
    ) -> Option<&'a RawFact> {
        let mut first_non_consolidated = None;
        for fact in self.candidates(keyword, kind, date) {
            if is_consolidated_context(&fact.context_ref) {
                return Some(fact);
            }
            if first_non_consolidated.is_none() {
                first_non_consolidated = Some(fact);
            }
        }
        if policy.allows_non_consolidated() {
            first_non_consolidated
        } else {
            None
        }
    }

    /// Facts matching `keyword` in non-dimensional contexts of `kind` at `date`.
    fn candidates(
        &self,
        keyword: &str,
        kind: ContextKind,
        date: NaiveDate,
    ) -> impl Iterator<Item = &'a RawFact> {
        let contexts = self.contexts;
        self.facts.iter().filter(move |fact| {
            matches(&fact.tag, keyword)
                && !has_member_dimension(&fact.context_ref)
                && contexts
                    .get(&fact.context_ref)
                    .is_some_and(|ctx| ctx.matches(kind, date))
        })
    }
}

/// Parses a fact's value.
///
/// Nil facts, blank values and text that does not parse as the requested kind
/// all yield `None`.
#[must_use]
pub fn parse_value(fact: &RawFact, kind: ValueKind) -> Option<FactValue> {
    if fact.is_nil {
        return None;
    }
    let text = fact.trimmed_value()?;
    let parsed = match kind {
        ValueKind::Integer => text.parse::<i64>().ok().map(FactValue::Integer),
        ValueKind::Decimal => text.parse::<f64>().ok().map(FactValue::Decimal),
    };
    if parsed.is_none() {
        debug!(tag = %fact.tag, context = %fact.context_ref, value = %text, "Unparseable fact value");
    }
    parsed
}
