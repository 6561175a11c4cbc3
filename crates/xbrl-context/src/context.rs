//! Context table construction.
//!
//! Every fact in an instance points at a context through its `contextRef`. This
//! module turns the context definitions into an immutable [`ContextTable`] that
//! classifies each context as an instant or a duration.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

use xbrl_core::{ContextKind, PeriodRange};

/// XBRL instance namespace.
pub const XBRLI_NS: &str = "http://www.xbrl.org/2003/instance";

/// Period of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Context {
    /// A point in time.
    Instant {
        /// The reported date.
        date: NaiveDate,
    },
    /// A span of time.
    Duration {
        /// First day of the span.
        start_date: NaiveDate,
        /// Last day of the span.
        end_date: NaiveDate,
    },
}

impl Context {
    /// Returns the context kind.
    #[must_use]
    pub const fn kind(&self) -> ContextKind {
        match self {
            Self::Instant { .. } => ContextKind::Instant,
            Self::Duration { .. } => ContextKind::Duration,
        }
    }

    /// Returns the date a fact in this context is reported at: the instant
    /// date, or the end of the duration.
    #[must_use]
    pub const fn reference_date(&self) -> NaiveDate {
        match *self {
            Self::Instant { date } => date,
            Self::Duration { end_date, .. } => end_date,
        }
    }

    /// Returns true if the context has the given kind and reference date.
    #[must_use]
    pub fn matches(&self, kind: ContextKind, date: NaiveDate) -> bool {
        self.kind() == kind && self.reference_date() == date
    }
}

/// A context definition as read from an instance, before classification.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextDefinition {
    /// Context id.
    pub id: String,
    /// Text of the `instant` element.
    pub instant: Option<String>,
    /// Text of the `startDate` element.
    pub start_date: Option<String>,
    /// Text of the `endDate` element.
    pub end_date: Option<String>,
}

impl ContextDefinition {
    /// Creates an instant definition.
    #[must_use]
    pub fn instant(id: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            instant: Some(date.into()),
            ..Default::default()
        }
    }

    /// Creates a duration definition.
    #[must_use]
    pub fn duration(
        id: impl Into<String>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            instant: None,
            start_date: Some(start_date.into()),
            end_date: Some(end_date.into()),
        }
    }

    /// Classifies the definition.
    ///
    /// Returns `None` when it has no usable period: no instant and not both
    /// duration bounds, or a date that does not parse.
    #[must_use]
    pub fn classify(&self) -> Option<Context> {
        if let Some(instant) = non_blank(self.instant.as_deref()) {
            return parse_date(&self.id, instant).map(|date| Context::Instant { date });
        }
        match (
            non_blank(self.start_date.as_deref()),
            non_blank(self.end_date.as_deref()),
        ) {
            (Some(start), Some(end)) => Some(Context::Duration {
                start_date: parse_date(&self.id, start)?,
                end_date: parse_date(&self.id, end)?,
            }),
            _ => {
                trace!(context = %self.id, "Context has no period, dropping");
                None
            }
        }
    }
}

/// Immutable map from context id to its period.
///
/// Iteration follows document order; a repeated id keeps its first position
/// and takes the last definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextTable {
    entries: Vec<(String, Context)>,
    index: HashMap<String, usize>,
}

impl ContextTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from context definitions, dropping malformed ones.
    pub fn from_definitions<I>(definitions: I) -> Self
    where
        I: IntoIterator<Item = ContextDefinition>,
    {
        let mut table = Self::new();
        for definition in definitions {
            if let Some(context) = definition.classify() {
                table.insert(definition.id, context);
            }
        }
        debug!(contexts = table.len(), "Built context table");
        table
    }

    /// Builds a table from an XBRL instance document.
    ///
    /// Scans every `context` element in the XBRL instance namespace; elements
    /// without an `id` or a usable `period` are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`xbrl_core::NormalizeError::Xml`] if the document is not
    /// well-formed XML.
    #[cfg(feature = "xml")]
    pub fn from_xml(xml: &str) -> xbrl_core::Result<Self> {
        let document = roxmltree::Document::parse(xml)
            .map_err(|e| xbrl_core::NormalizeError::Xml(e.to_string()))?;

        let definitions = document
            .descendants()
            .filter(|n| is_xbrli(n, "context"))
            .filter_map(|node| {
                let id = node.attribute("id").filter(|id| !id.is_empty())?;
                let period = node.children().find(|c| is_xbrli(c, "period"))?;
                let child_text = |name: &str| {
                    period
                        .children()
                        .find(|c| is_xbrli(c, name))
                        .and_then(|c| c.text())
                        .map(|t| t.trim().to_string())
                };
                Some(ContextDefinition {
                    id: id.to_string(),
                    instant: child_text("instant"),
                    start_date: child_text("startDate"),
                    end_date: child_text("endDate"),
                })
            });

        Ok(Self::from_definitions(definitions))
    }

    fn insert(&mut self, id: String, context: Context) {
        match self.index.get(&id) {
            Some(&pos) => self.entries[pos].1 = context,
            None => {
                self.index.insert(id.clone(), self.entries.len());
                self.entries.push((id, context));
            }
        }
    }

    /// Looks up a context by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Context> {
        self.index.get(id).map(|&pos| &self.entries[pos].1)
    }

    /// Returns the number of contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no contexts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(id, context)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Context)> {
        self.entries.iter().map(|(id, ctx)| (id.as_str(), ctx))
    }

    /// Iterates over the end dates of all duration contexts.
    pub fn duration_end_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.entries.iter().filter_map(|(_, ctx)| match *ctx {
            Context::Duration { end_date, .. } => Some(end_date),
            Context::Instant { .. } => None,
        })
    }

    /// Returns the span of the first duration context ending on `end`.
    #[must_use]
    pub fn duration_ending(&self, end: NaiveDate) -> Option<PeriodRange> {
        self.entries.iter().find_map(|(_, ctx)| match *ctx {
            Context::Duration {
                start_date,
                end_date,
            } if end_date == end => Some(PeriodRange {
                start: start_date,
                end: end_date,
            }),
            _ => None,
        })
    }
}

impl FromIterator<ContextDefinition> for ContextTable {
    fn from_iter<I: IntoIterator<Item = ContextDefinition>>(iter: I) -> Self {
        Self::from_definitions(iter)
    }
}

#[cfg(feature = "xml")]
fn is_xbrli(node: &roxmltree::Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().namespace() == Some(XBRLI_NS) && node.tag_name().name() == name
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an `xs:date`, ignoring any time or timezone suffix.
fn parse_date(context_id: &str, value: &str) -> Option<NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!(context = %context_id, value = %value, error = %e, "Unparseable context date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_classify_definitions() {
        let instant = ContextDefinition::instant("CurrentYearInstant", " 2025-03-31 ");
        assert_eq!(
            instant.classify(),
            Some(Context::Instant {
                date: date(2025, 3, 31)
            })
        );

        let duration = ContextDefinition::duration("CurrentYearDuration", "2024-04-01", "2025-03-31");
        assert_eq!(duration.classify().unwrap().kind(), ContextKind::Duration);
        assert_eq!(
            duration.classify().unwrap().reference_date(),
            date(2025, 3, 31)
        );
    }

    #[test]
    fn test_malformed_definitions_are_dropped() {
        let table = ContextTable::from_definitions(vec![
            ContextDefinition {
                id: "NoPeriod".into(),
                ..Default::default()
            },
            ContextDefinition {
                id: "HalfDuration".into(),
                start_date: Some("2024-04-01".into()),
                ..Default::default()
            },
            ContextDefinition::instant("BadDate", "31/03/2025"),
            ContextDefinition::instant("Good", "2025-03-31"),
        ]);
        assert_eq!(table.len(), 1);
        assert!(table.get("Good").is_some());
        assert!(table.get("BadDate").is_none());
    }

    #[test]
    fn test_repeated_id_keeps_position_and_last_value() {
        let table: ContextTable = vec![
            ContextDefinition::instant("A", "2025-03-31"),
            ContextDefinition::instant("B", "2024-03-31"),
            ContextDefinition::instant("A", "2025-03-20"),
        ]
        .into_iter()
        .collect();
        let ids: Vec<_> = table.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["A", "B"]);
        assert_eq!(
            table.get("A"),
            Some(&Context::Instant {
                date: date(2025, 3, 20)
            })
        );
    }

    #[test]
    fn test_duration_ending_uses_document_order() {
        let table = ContextTable::from_definitions(vec![
            ContextDefinition::instant("CurrentYearInstant", "2025-03-31"),
            ContextDefinition::duration("CurrentYearDuration", "2024-04-01", "2025-03-31"),
            ContextDefinition::duration("CurrentQuarterDuration", "2025-01-01", "2025-03-31"),
        ]);
        let range = table.duration_ending(date(2025, 3, 31)).unwrap();
        assert_eq!(range.start, date(2024, 4, 1));
        assert!(table.duration_ending(date(2024, 3, 31)).is_none());
    }

    #[test]
    fn test_datetime_suffix_is_ignored() {
        let ctx = ContextDefinition::instant("X", "2025-03-31T00:00:00").classify();
        assert_eq!(ctx.map(|c| c.reference_date()), Some(date(2025, 3, 31)));
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_from_xml() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<xbrli:xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
            xmlns:xbrldi="http://xbrl.org/2006/xbrldi"
            xmlns:jppfs_cor="http://example.com/jppfs_cor">
  <xbrli:context id="CurrentYearDuration">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E00001-000</xbrli:identifier></xbrli:entity>
    <xbrli:period>
      <xbrli:startDate>2024-04-01</xbrli:startDate>
      <xbrli:endDate>2025-03-31</xbrli:endDate>
    </xbrli:period>
  </xbrli:context>
  <xbrli:context id="CurrentYearInstant">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E00001-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:instant>
      2025-03-31
    </xbrli:instant></xbrli:period>
  </xbrli:context>
  <xbrli:context id="Forever">
    <xbrli:entity><xbrli:identifier scheme="http://disclosure.edinet-fsa.go.jp">E00001-000</xbrli:identifier></xbrli:entity>
    <xbrli:period><xbrli:forever/></xbrli:period>
  </xbrli:context>
  <xbrli:context>
    <xbrli:period><xbrli:instant>2025-03-31</xbrli:instant></xbrli:period>
  </xbrli:context>
  <jppfs_cor:NetSales contextRef="CurrentYearDuration" unitRef="JPY" decimals="-6">1000000</jppfs_cor:NetSales>
</xbrli:xbrl>"#;

        let table = ContextTable::from_xml(xml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.get("CurrentYearDuration"),
            Some(&Context::Duration {
                start_date: date(2024, 4, 1),
                end_date: date(2025, 3, 31),
            })
        );
        assert_eq!(
            table.get("CurrentYearInstant").map(Context::kind),
            Some(ContextKind::Instant)
        );
        assert!(table.get("Forever").is_none());
    }

    #[cfg(feature = "xml")]
    #[test]
    fn test_from_xml_rejects_malformed_document() {
        let err = ContextTable::from_xml("<xbrli:xbrl>").unwrap_err();
        assert!(matches!(err, xbrl_core::NormalizeError::Xml(_)));
    }
}
