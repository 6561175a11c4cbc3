//! Period and statement-section definitions.
//!
//! This module defines [`Period`] for selecting the current or prior fiscal year
//! and [`Section`] for the statement sections a filing is normalized into.

use serde::{Deserialize, Serialize};

/// Fiscal year a lookup targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// The fiscal year ending on the latest duration end date.
    Current,
    /// The fiscal year immediately before the current one.
    Prior,
}

impl Period {
    /// Returns the snake-case name used in output documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Current => "current",
            Self::Prior => "prior",
        }
    }
}

impl std::fmt::Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of XBRL context a section is reported against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    /// Point-in-time values (balance sheet, share counts).
    Instant,
    /// Values accumulated over a period (income, cash flow, dividends).
    Duration,
}

/// How a fact's text value is parsed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Whole amounts and counts.
    Integer,
    /// Ratios and per-share figures.
    #[default]
    Decimal,
}

/// Statement section of a filing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    /// Income statement.
    Pl,
    /// Balance sheet.
    Bs,
    /// Cash flow statement.
    Cf,
    /// Dividends per share.
    Dividend,
    /// Issued share counts.
    Shares,
    /// Document and entity information.
    Dei,
}

impl Section {
    /// Sections holding numeric facts, in extraction order.
    pub const NUMERIC: [Self; 5] = [Self::Pl, Self::Bs, Self::Cf, Self::Dividend, Self::Shares];

    /// Context kind the section's facts are reported against.
    ///
    /// Returns `None` for [`Section::Dei`], whose tags are matched regardless of
    /// period.
    #[must_use]
    pub const fn context_kind(&self) -> Option<ContextKind> {
        match self {
            Self::Pl | Self::Cf | Self::Dividend => Some(ContextKind::Duration),
            Self::Bs | Self::Shares => Some(ContextKind::Instant),
            Self::Dei => None,
        }
    }

    /// Value parsing used for the section.
    #[must_use]
    pub const fn value_kind(&self) -> ValueKind {
        match self {
            Self::Dividend => ValueKind::Decimal,
            Self::Pl | Self::Bs | Self::Cf | Self::Shares | Self::Dei => ValueKind::Integer,
        }
    }

    /// Returns true if a consolidated-only filing must not fall back to
    /// standalone figures in this section.
    ///
    /// Dividends and share counts are reported on the parent entity, so they
    /// always accept non-consolidated contexts.
    #[must_use]
    pub const fn honours_consolidated_only(&self) -> bool {
        matches!(self, Self::Pl | Self::Bs | Self::Cf)
    }

    /// Returns the snake-case section name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pl => "pl",
            Self::Bs => "bs",
            Self::Cf => "cf",
            Self::Dividend => "dividend",
            Self::Shares => "shares",
            Self::Dei => "dei",
        }
    }
}

impl std::fmt::Display for Section {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
