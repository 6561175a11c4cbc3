//! Canonical fact set construction.

use tracing::info;

use xbrl_core::{
    CanonicalKeys, FactKeySpec, FactSet, FactValue, FactYear, NormalizedDocument,
    NormalizedYearBlock, SectionValues, ValueKind,
};

use crate::priority::PriorityEngine;
use crate::standard::{normalize_accounting_standard, normalize_security_code};

/// Builds canonical fact sets from normalized documents.
///
/// Only facts reported in the statements are published. Ratios, growth rates
/// and debt totals are left to consumers.
#[derive(Clone, Copy, Debug)]
pub struct FactMaster<'a> {
    keys: &'a CanonicalKeys,
    engine: PriorityEngine<'a>,
}

impl<'a> FactMaster<'a> {
    /// Creates a fact master over a canonical vocabulary.
    #[must_use]
    pub const fn new(keys: &'a CanonicalKeys) -> Self {
        Self {
            keys,
            engine: PriorityEngine::new(keys),
        }
    }

    /// Computes the fact set of one document.
    #[must_use]
    pub fn compute(&self, doc: &NormalizedDocument) -> FactSet {
        let current = self.facts(&doc.current_year);
        let prior = self.facts(&doc.prior_year);

        info!(
            doc_id = %doc.doc_id,
            current = current.present_count(),
            prior = prior.present_count(),
            "Computed fact set"
        );

        FactSet {
            doc_id: doc.doc_id.clone(),
            security_code: doc.security_code.as_deref().map(normalize_security_code),
            fiscal_year_end: doc.fiscal_year_end,
            report_type: doc.report_type,
            consolidation_type: doc.consolidation_type,
            accounting_standard: normalize_accounting_standard(
                doc.accounting_standard.as_deref(),
                &self.keys.accounting_standard_mapping,
            ),
            current_year: (current.present_count() > 0).then_some(current),
            prior_year: (prior.present_count() > 0).then_some(prior),
        }
    }

    /// Extracts the canonical facts of one year, nulls included.
    #[must_use]
    pub fn facts(&self, block: &NormalizedYearBlock) -> FactYear {
        let sources = block.merged();
        let metrics = self
            .keys
            .fact_keys
            .iter()
            .map(|spec| (spec.key.clone(), self.resolve_fact(spec, &sources)))
            .collect();
        FactYear {
            metrics,
            period: block.period,
        }
    }

    fn resolve_fact(&self, spec: &FactKeySpec, sources: &SectionValues) -> Option<FactValue> {
        let raw = match self.engine.resolve(&spec.key, sources) {
            Some(resolved) => resolved,
            None => sources.get(spec.source_key()).copied().flatten(),
        };
        raw.and_then(|value| coerce(value, spec.kind))
    }
}

fn coerce(value: FactValue, kind: ValueKind) -> Option<FactValue> {
    match kind {
        ValueKind::Integer => value.as_i64().map(FactValue::Integer),
        ValueKind::Decimal => Some(FactValue::Decimal(value.as_f64())),
    }
}
