//! Fiscal year-end resolution.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use xbrl_core::Period;

use crate::context::ContextTable;

/// Current and prior fiscal year-end dates of a filing.
///
/// Every current/prior decision of a document pass is made against these two
/// dates rather than against context ids.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FiscalPeriod {
    /// Latest duration end date in the filing.
    pub current_year_end: Option<NaiveDate>,
    /// Latest duration end date falling in the calendar year before
    /// `current_year_end`.
    pub prior_year_end: Option<NaiveDate>,
}

impl FiscalPeriod {
    /// Derives the year-ends from the duration contexts of a table.
    ///
    /// With no duration contexts both dates are `None`. Contexts with
    /// unparseable dates never reach the table, so they are skipped here too.
    #[must_use]
    pub fn resolve(contexts: &ContextTable) -> Self {
        let mut end_dates: Vec<NaiveDate> = contexts.duration_end_dates().collect();
        end_dates.sort_unstable_by(|a, b| b.cmp(a));
        end_dates.dedup();

        let Some(&current) = end_dates.first() else {
            debug!("No duration contexts, fiscal period unresolved");
            return Self::default();
        };
        let prior = end_dates
            .iter()
            .copied()
            .find(|d| d.year() == current.year() - 1);

        debug!(current_year_end = %current, prior_year_end = ?prior, "Resolved fiscal period");
        Self {
            current_year_end: Some(current),
            prior_year_end: prior,
        }
    }

    /// Returns the year-end date for a period.
    #[must_use]
    pub const fn year_end(&self, period: Period) -> Option<NaiveDate> {
        match period {
            Period::Current => self.current_year_end,
            Period::Prior => self.prior_year_end,
        }
    }

    /// Returns true if no duration context was found.
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        self.current_year_end.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextDefinition;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_current_is_max_duration_end() {
        let table = ContextTable::from_definitions(vec![
            ContextDefinition::duration("Prior1YearDuration", "2023-04-01", "2024-03-31"),
            ContextDefinition::duration("CurrentYearDuration", "2024-04-01", "2025-03-31"),
            ContextDefinition::instant("FutureInstant", "2025-06-30"),
            ContextDefinition::duration("Prior2YearDuration", "2022-04-01", "2023-03-31"),
        ]);
        let fp = FiscalPeriod::resolve(&table);
        assert_eq!(fp.current_year_end, Some(date(2025, 3, 31)));
        assert_eq!(fp.prior_year_end, Some(date(2024, 3, 31)));
        assert_eq!(fp.year_end(Period::Prior), Some(date(2024, 3, 31)));
    }

    #[test]
    fn test_prior_takes_latest_date_in_previous_year() {
        let table = ContextTable::from_definitions(vec![
            ContextDefinition::duration("A", "2024-01-01", "2024-12-31"),
            ContextDefinition::duration("B", "2023-01-01", "2023-06-30"),
            ContextDefinition::duration("C", "2023-01-01", "2023-12-31"),
        ]);
        let fp = FiscalPeriod::resolve(&table);
        assert_eq!(fp.current_year_end, Some(date(2024, 12, 31)));
        assert_eq!(fp.prior_year_end, Some(date(2023, 12, 31)));
    }

    #[test]
    fn test_no_prior_year() {
        let table = ContextTable::from_definitions(vec![
            ContextDefinition::duration("A", "2024-04-01", "2025-03-31"),
            ContextDefinition::duration("B", "2022-04-01", "2023-03-31"),
        ]);
        let fp = FiscalPeriod::resolve(&table);
        assert_eq!(fp.current_year_end, Some(date(2025, 3, 31)));
        assert_eq!(fp.prior_year_end, None);
    }

    #[test]
    fn test_no_duration_contexts() {
        let table = ContextTable::from_definitions(vec![ContextDefinition::instant(
            "CurrentYearInstant",
            "2025-03-31",
        )]);
        let fp = FiscalPeriod::resolve(&table);
        assert!(fp.is_unresolved());
        assert_eq!(fp.prior_year_end, None);
    }
}
