//! Rule tables driving normalization.
//!
//! A [`RuleSet`] is built once per process and shared read-only by every
//! document pass. It bundles:
//!
//! - [`TaxonomyMapping`] - ordered tag-to-key rules per statement section
//! - [`CanonicalKeys`] - the published fact keys, their synonym priority lists
//!   and the accounting-standard alias table
//!
//! Both tables ship with EDINET defaults and can be deserialized from YAML.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{NormalizeError, Result};
use crate::period::{Section, ValueKind};

/// Maps one tag local name to a canonical key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagRule {
    /// Local tag name the fact must match exactly.
    pub tag: String,
    /// Canonical key the value is stored under.
    pub key: String,
}

impl TagRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(tag: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: key.into(),
        }
    }
}

/// Document and entity information fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeiField {
    /// Listed security code.
    SecurityCode,
    /// Filer name.
    CompanyName,
    /// Accounting standard the statements follow.
    AccountingStandard,
    /// Whether consolidated statements are prepared.
    #[serde(rename = "is_consolidated_dei")]
    IsConsolidated,
    /// End date of the reported period.
    CurrentPeriodEndDate,
    /// End date of the current fiscal year.
    CurrentFiscalYearEndDate,
}

/// Maps one DEI tag local name to a metadata field.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeiRule {
    /// Local tag name the fact must match exactly.
    pub tag: String,
    /// Field the value populates.
    pub key: DeiField,
}

/// Ordered tag rules for every statement section.
///
/// Order matters: within a section the first rule that resolves a key wins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyMapping {
    /// Income statement rules.
    #[serde(default)]
    pub pl: Vec<TagRule>,
    /// Balance sheet rules.
    #[serde(default)]
    pub bs: Vec<TagRule>,
    /// Cash flow rules.
    #[serde(default)]
    pub cf: Vec<TagRule>,
    /// Dividend rules.
    #[serde(default)]
    pub dividend: Vec<TagRule>,
    /// Issued share count rules.
    #[serde(default)]
    pub shares: Vec<TagRule>,
    /// Entity information rules.
    #[serde(default)]
    pub dei: Vec<DeiRule>,
}

impl TaxonomyMapping {
    /// Parses a mapping from YAML.
    ///
    /// Entries with an empty tag or key are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Config`] when the document is not a valid mapping.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let mut mapping: Self = serde_yaml::from_str(yaml)?;
        for rules in [
            &mut mapping.pl,
            &mut mapping.bs,
            &mut mapping.cf,
            &mut mapping.dividend,
            &mut mapping.shares,
        ] {
            rules.retain(|r| !r.tag.is_empty() && !r.key.is_empty());
        }
        mapping.dei.retain(|r| !r.tag.is_empty());
        for section in Section::NUMERIC {
            debug!(
                section = %section,
                entries = mapping.rules(section).len(),
                "Loaded taxonomy mapping"
            );
        }
        Ok(mapping)
    }

    /// Returns the numeric rules of a section.
    ///
    /// [`Section::Dei`] has no numeric rules; use [`TaxonomyMapping::dei`].
    #[must_use]
    pub fn rules(&self, section: Section) -> &[TagRule] {
        match section {
            Section::Pl => &self.pl,
            Section::Bs => &self.bs,
            Section::Cf => &self.cf,
            Section::Dividend => &self.dividend,
            Section::Shares => &self.shares,
            Section::Dei => &[],
        }
    }
}

impl Default for TaxonomyMapping {
    fn default() -> Self {
        let rules = |table: &[(&str, &str)]| {
            table
                .iter()
                .map(|(tag, key)| TagRule::new(*tag, *key))
                .collect::<Vec<_>>()
        };
        Self {
            pl: rules(PL_RULES),
            bs: rules(BS_RULES),
            cf: rules(CF_RULES),
            dividend: rules(DIVIDEND_RULES),
            shares: rules(SHARES_RULES),
            dei: DEI_RULES
                .iter()
                .map(|(tag, key)| DeiRule {
                    tag: (*tag).to_string(),
                    key: *key,
                })
                .collect(),
        }
    }
}

/// A published fact key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactKeySpec {
    /// Canonical key name.
    pub key: String,
    /// Normalized keys tried in priority order; the first non-null one wins.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Vec<String>>,
    /// Normalized key to read when it differs from `key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalizer_key: Option<String>,
    /// Output value kind.
    #[serde(default)]
    pub kind: ValueKind,
}

impl FactKeySpec {
    /// Creates a decimal key read from the normalized key of the same name.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            resolution: None,
            normalizer_key: None,
            kind: ValueKind::Decimal,
        }
    }

    /// Sets the synonym priority list.
    #[must_use]
    pub fn with_resolution<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolution = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    /// Reads the value from a differently named normalized key.
    #[must_use]
    pub fn with_normalizer_key(mut self, key: impl Into<String>) -> Self {
        self.normalizer_key = Some(key.into());
        self
    }

    /// Sets the output value kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Normalized key the value is read from when no resolution list is set.
    #[must_use]
    pub fn source_key(&self) -> &str {
        self.normalizer_key.as_deref().unwrap_or(&self.key)
    }
}

/// The canonical fact vocabulary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalKeys {
    /// Published keys, in output order.
    pub fact_keys: Vec<FactKeySpec>,
    /// Keys computed downstream; never published as facts.
    #[serde(default)]
    pub derived_keys: Vec<String>,
    /// Accounting standard spellings to their normalized name.
    #[serde(default)]
    pub accounting_standard_mapping: BTreeMap<String, String>,
}

impl CanonicalKeys {
    /// Parses the vocabulary from YAML and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Config`] when the document is malformed or a
    /// derived key is declared as a fact key.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let keys: Self = serde_yaml::from_str(yaml)?;
        keys.validate()?;
        debug!(
            fact_keys = keys.fact_keys.len(),
            derived_keys = keys.derived_keys.len(),
            "Loaded canonical keys"
        );
        Ok(keys)
    }

    /// Checks that no fact key is also a derived key and no key repeats.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Config`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();
        for spec in &self.fact_keys {
            if spec.key.is_empty() {
                return Err(NormalizeError::Config("empty fact key".to_string()));
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(NormalizeError::Config(format!(
                    "duplicate fact key: {}",
                    spec.key
                )));
            }
            if self.is_derived(&spec.key) {
                return Err(NormalizeError::Config(format!(
                    "derived key declared as fact key: {}",
                    spec.key
                )));
            }
        }
        Ok(())
    }

    /// Looks up a fact key.
    #[must_use]
    pub fn spec(&self, key: &str) -> Option<&FactKeySpec> {
        self.fact_keys.iter().find(|s| s.key == key)
    }

    /// Returns true if `key` is computed downstream.
    #[must_use]
    pub fn is_derived(&self, key: &str) -> bool {
        self.derived_keys.iter().any(|d| d == key)
    }
}

impl Default for CanonicalKeys {
    fn default() -> Self {
        let fact_keys = vec![
            FactKeySpec::new("net_sales"),
            FactKeySpec::new("operating_income"),
            FactKeySpec::new("ordinary_income"),
            FactKeySpec::new("net_income_attributable_to_parent")
                .with_resolution(["net_income_attributable_to_parent", "net_income"]),
            FactKeySpec::new("total_assets"),
            FactKeySpec::new("equity").with_resolution([
                "shareholders_equity",
                "equity_attributable_to_owners_of_parent",
                "equity",
                "net_assets",
            ]),
            FactKeySpec::new("cash_and_equivalents")
                .with_normalizer_key("cash_and_cash_equivalents"),
            FactKeySpec::new("operating_cash_flow"),
            FactKeySpec::new("investing_cash_flow"),
            FactKeySpec::new("financing_cash_flow"),
            FactKeySpec::new("depreciation"),
            FactKeySpec::new("dividends_per_share"),
            FactKeySpec::new("total_number_of_issued_shares").with_kind(ValueKind::Integer),
            FactKeySpec::new("short_term_borrowings"),
            FactKeySpec::new("current_portion_of_long_term_borrowings"),
            FactKeySpec::new("commercial_papers"),
            FactKeySpec::new("current_portion_of_bonds"),
            FactKeySpec::new("bonds_payable"),
            FactKeySpec::new("long_term_borrowings"),
            FactKeySpec::new("short_term_lease_obligations"),
            FactKeySpec::new("long_term_lease_obligations"),
        ];
        Self {
            fact_keys,
            derived_keys: DERIVED_KEYS.iter().map(|k| (*k).to_string()).collect(),
            accounting_standard_mapping: ACCOUNTING_STANDARD_ALIASES
                .iter()
                .map(|(from, to)| ((*from).to_string(), (*to).to_string()))
                .collect(),
        }
    }
}

/// Everything a document pass needs, constructed once per process.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Tag-to-key tables.
    pub taxonomy: TaxonomyMapping,
    /// Canonical vocabulary and resolution rules.
    pub canonical: CanonicalKeys,
}

impl RuleSet {
    /// Creates a rule set from explicit tables.
    #[must_use]
    pub const fn new(taxonomy: TaxonomyMapping, canonical: CanonicalKeys) -> Self {
        Self {
            taxonomy,
            canonical,
        }
    }

    /// Parses both tables from their YAML documents.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Config`] if either document is invalid.
    pub fn from_yaml_str(taxonomy_yaml: &str, canonical_yaml: &str) -> Result<Self> {
        Ok(Self::new(
            TaxonomyMapping::from_yaml_str(taxonomy_yaml)?,
            CanonicalKeys::from_yaml_str(canonical_yaml)?,
        ))
    }
}

// =============================================================================
// EDINET defaults
// =============================================================================

const PL_RULES: &[(&str, &str)] = &[
    ("NetSales", "net_sales"),
    ("RevenueIFRS", "net_sales"),
    ("OperatingRevenue1", "net_sales"),
    ("OperatingRevenue2", "net_sales"),
    ("OperatingIncome", "operating_income"),
    ("OperatingProfitLossIFRS", "operating_income"),
    ("OrdinaryIncome", "ordinary_income"),
    (
        "ProfitLossAttributableToOwnersOfParent",
        "net_income_attributable_to_parent",
    ),
    (
        "ProfitLossAttributableToOwnersOfParentIFRS",
        "net_income_attributable_to_parent",
    ),
    ("NetIncome", "net_income"),
    ("ProfitLoss", "profit_loss"),
];

const BS_RULES: &[(&str, &str)] = &[
    ("TotalAssets", "total_assets"),
    ("AssetsIFRS", "total_assets"),
    ("NetAssets", "net_assets"),
    ("ShareholdersEquity", "shareholders_equity"),
    (
        "EquityAttributableToOwnersOfParentIFRS",
        "equity_attributable_to_owners_of_parent",
    ),
    ("EquityIFRS", "equity"),
    ("CashAndDeposits", "cash_and_deposits"),
    ("CashAndCashEquivalents", "cash_and_cash_equivalents"),
    ("CashAndCashEquivalentsIFRS", "cash_and_cash_equivalents"),
    ("ShortTermLoansPayable", "short_term_borrowings"),
    ("BorrowingsCLIFRS", "short_term_borrowings"),
    (
        "CurrentPortionOfLongTermLoansPayable",
        "current_portion_of_long_term_borrowings",
    ),
    ("CommercialPapersLiabilities", "commercial_papers"),
    ("CurrentPortionOfBonds", "current_portion_of_bonds"),
    ("BondsPayable", "bonds_payable"),
    ("LongTermLoansPayable", "long_term_borrowings"),
    ("BorrowingsNCLIFRS", "long_term_borrowings"),
    ("LeaseObligationsCL", "short_term_lease_obligations"),
    ("LeaseObligationsNCL", "long_term_lease_obligations"),
];

const CF_RULES: &[(&str, &str)] = &[
    (
        "NetCashProvidedByUsedInOperatingActivities",
        "operating_cash_flow",
    ),
    (
        "NetCashProvidedByUsedInOperatingActivitiesIFRS",
        "operating_cash_flow",
    ),
    (
        "NetCashProvidedByUsedInInvestingActivities",
        "investing_cash_flow",
    ),
    (
        "NetCashProvidedByUsedInInvestingActivitiesIFRS",
        "investing_cash_flow",
    ),
    (
        "NetCashProvidedByUsedInFinancingActivities",
        "financing_cash_flow",
    ),
    (
        "NetCashProvidedByUsedInFinancingActivitiesIFRS",
        "financing_cash_flow",
    ),
    ("DepreciationAndAmortizationOpeCF", "depreciation"),
    ("DepreciationAndAmortizationOpeCFIFRS", "depreciation"),
];

const DIVIDEND_RULES: &[(&str, &str)] = &[
    (
        "DividendPaidPerShareSummaryOfBusinessResults",
        "dividends_per_share",
    ),
    (
        "InterimDividendPaidPerShareSummaryOfBusinessResults",
        "interim_dividends_per_share",
    ),
];

const SHARES_RULES: &[(&str, &str)] = &[
    (
        "TotalNumberOfIssuedSharesSummaryOfBusinessResults",
        "total_number_of_issued_shares",
    ),
    (
        "NumberOfIssuedSharesAsOfFiscalYearEndIssuedSharesTotalNumberOfSharesEtc",
        "total_number_of_issued_shares",
    ),
];

const DEI_RULES: &[(&str, DeiField)] = &[
    ("SecurityCodeDEI", DeiField::SecurityCode),
    ("FilerNameInJapaneseDEI", DeiField::CompanyName),
    ("FilerNameInEnglishDEI", DeiField::CompanyName),
    ("AccountingStandardsDEI", DeiField::AccountingStandard),
    (
        "WhetherConsolidatedFinancialStatementsArePreparedDEI",
        DeiField::IsConsolidated,
    ),
    ("CurrentPeriodEndDateDEI", DeiField::CurrentPeriodEndDate),
    ("CurrentFiscalYearEndDateDEI", DeiField::CurrentFiscalYearEndDate),
];

const DERIVED_KEYS: &[&str] = &[
    "roe",
    "roa",
    "roic",
    "operating_margin",
    "net_margin",
    "equity_ratio",
    "de_ratio",
    "sales_growth",
    "profit_growth",
    "eps_growth",
    "per",
    "pbr",
    "psr",
    "peg",
    "dividend_yield",
    "free_cash_flow",
    "cagr",
    "profit_loss",
    "earnings_per_share",
];

const ACCOUNTING_STANDARD_ALIASES: &[(&str, &str)] = &[
    ("Japan GAAP", "JGAAP"),
    ("日本基準", "JGAAP"),
    ("JGAAP", "JGAAP"),
    ("IFRS", "IFRS"),
    ("US GAAP", "US-GAAP"),
    ("US-GAAP", "US-GAAP"),
];
