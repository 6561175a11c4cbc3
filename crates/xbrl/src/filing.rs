//! A filing ready for normalization.

use xbrl_context::ContextTable;
use xbrl_core::FilingInput;

#[cfg(feature = "xml")]
use xbrl_core::{NormalizeError, RawFact, Result};

/// XML Schema instance namespace, for `xsi:nil`.
#[cfg(feature = "xml")]
const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// The facts of one filing together with its context table.
#[derive(Clone, Debug, Default)]
pub struct Filing {
    /// Parsed facts and identifiers.
    pub input: FilingInput,
    /// Context table built from the same instance document.
    pub contexts: ContextTable,
}

impl Filing {
    /// Bundles already-parsed facts with their context table.
    #[must_use]
    pub const fn new(input: FilingInput, contexts: ContextTable) -> Self {
        Self { input, contexts }
    }

    /// Returns the document id.
    #[must_use]
    pub fn doc_id(&self) -> &str {
        &self.input.doc_id
    }

    /// Builds the context table from an instance document and pairs it with
    /// facts parsed elsewhere.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Xml`] if the document is not well-formed.
    #[cfg(feature = "xml")]
    pub fn from_instance_xml(input: FilingInput, xml: &str) -> Result<Self> {
        Ok(Self::new(input, ContextTable::from_xml(xml)?))
    }

    /// Parses both facts and contexts from an instance document.
    ///
    /// Every element carrying a `contextRef` attribute becomes a fact, tagged
    /// `{namespace}LocalName`. Elements with `xsi:nil="true"` become nil facts.
    ///
    /// # Errors
    ///
    /// Returns [`NormalizeError::Xml`] if the document is not well-formed.
    #[cfg(feature = "xml")]
    pub fn parse_instance(doc_id: impl Into<String>, xml: &str) -> Result<Self> {
        let contexts = ContextTable::from_xml(xml)?;
        let document =
            roxmltree::Document::parse(xml).map_err(|e| NormalizeError::Xml(e.to_string()))?;

        let facts: Vec<RawFact> = document
            .descendants()
            .filter(roxmltree::Node::is_element)
            .filter_map(|node| {
                let context_ref = node.attribute("contextRef")?;
                let name = node.tag_name();
                let tag = match name.namespace() {
                    Some(ns) => format!("{{{ns}}}{}", name.name()),
                    None => name.name().to_string(),
                };
                let nil = node
                    .attribute((XSI_NS, "nil"))
                    .is_some_and(|v| v.trim() == "true");
                Some(if nil {
                    RawFact::nil(tag, context_ref)
                } else {
                    RawFact::new(tag, context_ref, node.text().unwrap_or_default())
                })
            })
            .collect();

        tracing::debug!(facts = facts.len(), contexts = contexts.len(), "Parsed instance document");
        Ok(Self::new(FilingInput::new(doc_id, facts), contexts))
    }
}
