//! Single-document pipeline: normalize, check, compute facts.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use xbrl_core::{FactSet, NormalizedDocument, RuleSet};
use xbrl_facts::FactMaster;
use xbrl_normalize::Normalizer;

use crate::filing::Filing;

/// Result of processing one filing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The filing produced a fact set.
    Processed(FactSet),
    /// The filing lacks identifiers needed downstream.
    Skipped {
        /// Document identifier.
        doc_id: String,
        /// Why it was skipped.
        reason: String,
    },
}

impl Outcome {
    /// Returns the fact set, if the filing was processed.
    #[must_use]
    pub const fn fact_set(&self) -> Option<&FactSet> {
        match self {
            Self::Processed(facts) => Some(facts),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns true if the filing was skipped.
    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }
}

/// Normalization pipeline sharing one immutable rule set.
///
/// Cloning is cheap; every clone refers to the same [`RuleSet`].
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    rules: Arc<RuleSet>,
}

impl Pipeline {
    /// Create a pipeline over a rule set.
    #[must_use]
    pub fn new(rules: RuleSet) -> Self {
        Self {
            rules: Arc::new(rules),
        }
    }

    /// Create a pipeline over an already shared rule set.
    #[must_use]
    pub const fn with_shared_rules(rules: Arc<RuleSet>) -> Self {
        Self { rules }
    }

    /// Returns the rule set.
    #[must_use]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Normalizes one filing into its two-period view.
    #[must_use]
    pub fn normalize(&self, filing: &Filing) -> NormalizedDocument {
        Normalizer::new(&self.rules.taxonomy, &filing.input, &filing.contexts).normalize()
    }

    /// Normalizes one filing and computes its canonical facts.
    ///
    /// Filings without a security code or fiscal-year-end date are skipped.
    #[must_use]
    pub fn process(&self, filing: &Filing) -> Outcome {
        let doc = self.normalize(filing);
        if let Err(e) = doc.ensure_usable() {
            debug!(doc_id = %doc.doc_id, reason = %e, "Skipping filing");
            return Outcome::Skipped {
                doc_id: doc.doc_id,
                reason: e.to_string(),
            };
        }
        Outcome::Processed(FactMaster::new(&self.rules.canonical).compute(&doc))
    }
}
