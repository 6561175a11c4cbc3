//! Two-period normalization of one filing.

use tracing::{debug, instrument};

use xbrl_context::{ContextTable, FiscalPeriod};
use xbrl_core::{
    ConsolidationType, FilingInput, NormalizedDocument, NormalizedYearBlock, Period, ReportType,
    Section, SectionValues, TaxonomyMapping,
};

use crate::anchor::resolve_balance_sheet;
use crate::metadata::{extract_metadata, EntityMetadata};
use crate::selector::{CandidateSelector, ConsolidationPolicy, Target};

/// Normalizes one filing against a taxonomy mapping.
///
/// The context table and fiscal period are computed once at construction and
/// shared by every section and period pass.
#[derive(Debug)]
pub struct Normalizer<'a> {
    rules: &'a TaxonomyMapping,
    input: &'a FilingInput,
    contexts: &'a ContextTable,
    fiscal: FiscalPeriod,
}

impl<'a> Normalizer<'a> {
    /// Creates a normalizer for one filing.
    #[must_use]
    pub fn new(
        rules: &'a TaxonomyMapping,
        input: &'a FilingInput,
        contexts: &'a ContextTable,
    ) -> Self {
        let fiscal = FiscalPeriod::resolve(contexts);
        Self {
            rules,
            input,
            contexts,
            fiscal,
        }
    }

    /// Returns the resolved fiscal period.
    #[must_use]
    pub const fn fiscal_period(&self) -> FiscalPeriod {
        self.fiscal
    }

    /// Extracts the filer metadata.
    #[must_use]
    pub fn metadata(&self) -> EntityMetadata {
        extract_metadata(&self.input.doc_id, &self.input.facts, &self.rules.dei)
    }

    fn selector(&self) -> CandidateSelector<'a> {
        CandidateSelector::new(&self.input.facts, self.contexts)
    }

    /// Extracts one numeric section for one period.
    ///
    /// `consolidated_only` applies to the income statement, balance sheet and
    /// cash flow sections; dividends and share counts accept standalone
    /// figures. The balance sheet falls back to the anchor date when total
    /// assets are missing. [`Section::Dei`] yields an empty map.
    #[must_use]
    pub fn extract(&self, section: Section, period: Period, consolidated_only: bool) -> SectionValues {
        let Some(kind) = section.context_kind() else {
            return SectionValues::new();
        };
        let date = self.fiscal.year_end(period);
        let policy = ConsolidationPolicy::from_consolidated_only(
            consolidated_only && section.honours_consolidated_only(),
        );
        let rules = self.rules.rules(section);
        let selector = self.selector();

        match section {
            Section::Bs => resolve_balance_sheet(&selector, rules, date, policy),
            Section::Pl | Section::Cf | Section::Dividend | Section::Shares => selector.select(
                rules,
                Target {
                    kind,
                    date,
                    policy,
                    value_kind: section.value_kind(),
                },
            ),
            Section::Dei => SectionValues::new(),
        }
    }

    /// Builds the block for one period. Share counts are merged into the
    /// balance sheet, overriding on key collisions.
    #[must_use]
    pub fn year_block(&self, period: Period, consolidated_only: bool) -> NormalizedYearBlock {
        let mut bs = self.extract(Section::Bs, period, consolidated_only);
        bs.extend(self.extract(Section::Shares, period, consolidated_only));
        NormalizedYearBlock {
            pl: self.extract(Section::Pl, period, consolidated_only),
            bs,
            cf: self.extract(Section::Cf, period, consolidated_only),
            dividend: self.extract(Section::Dividend, period, consolidated_only),
            period: self
                .fiscal
                .year_end(period)
                .and_then(|end| self.contexts.duration_ending(end)),
        }
    }

    /// Produces the normalized document.
    ///
    /// Filings that declare consolidated statements are read in
    /// consolidated-only mode.
    #[instrument(skip(self), fields(doc_id = %self.input.doc_id))]
    pub fn normalize(&self) -> NormalizedDocument {
        let meta = self.metadata();
        let consolidated_only = meta.is_consolidated;
        debug!(
            current_year_end = ?self.fiscal.current_year_end,
            prior_year_end = ?self.fiscal.prior_year_end,
            consolidated_only,
            "Normalizing filing"
        );

        NormalizedDocument {
            doc_id: self.input.doc_id.clone(),
            security_code: meta.security_code,
            company_name: meta.company_name,
            accounting_standard: meta.accounting_standard,
            is_consolidated: meta.is_consolidated,
            consolidation_type: ConsolidationType::from(meta.is_consolidated),
            fiscal_year_end: meta.fiscal_year_end,
            report_type: ReportType::Annual,
            current_year: self.year_block(Period::Current, consolidated_only),
            prior_year: self.year_block(Period::Prior, consolidated_only),
        }
    }
}
