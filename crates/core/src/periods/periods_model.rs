//! Period domain models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::month_key::MonthKey;
use crate::constants::{DEFAULT_MONTHS_AFTER, DEFAULT_MONTHS_BEFORE, DEFAULT_PERIOD_SIZE};
use crate::utils::Clock;

/// A contiguous run of months shown together as one tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub index: usize,
    pub label: String,
    pub months: Vec<MonthKey>,
}

impl Period {
    pub fn new(index: usize, months: Vec<MonthKey>) -> Self {
        let label = period_label(&months);
        Period {
            index,
            label,
            months,
        }
    }

    pub fn first(&self) -> Option<MonthKey> {
        self.months.first().copied()
    }

    pub fn last(&self) -> Option<MonthKey> {
        self.months.last().copied()
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    pub fn contains(&self, month: &MonthKey) -> bool {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => first <= *month && *month <= last,
            _ => false,
        }
    }
}

/// `"2025"` when the run stays within one year, `"2024-2025"` otherwise.
fn period_label(months: &[MonthKey]) -> String {
    match (months.first(), months.last()) {
        (Some(first), Some(last)) if first.year() == last.year() => first.year().to_string(),
        (Some(first), Some(last)) => format!("{}-{}", first.year(), last.year()),
        _ => String::new(),
    }
}

/// Shape of a rolling window: how far back, how far ahead, and how many months
/// per tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodWindow {
    pub months_before: i32,
    pub months_after: i32,
    pub period_size: usize,
}

impl Default for PeriodWindow {
    fn default() -> Self {
        PeriodWindow {
            months_before: DEFAULT_MONTHS_BEFORE,
            months_after: DEFAULT_MONTHS_AFTER,
            period_size: DEFAULT_PERIOD_SIZE,
        }
    }
}

impl PeriodWindow {
    pub fn periods(&self, anchor_date: NaiveDate) -> Vec<Period> {
        super::generate_periods(
            anchor_date,
            self.months_before,
            self.months_after,
            self.period_size,
        )
    }

    /// Periods anchored on the clock's current date.
    pub fn periods_from(&self, clock: &dyn Clock) -> Vec<Period> {
        self.periods(clock.today())
    }

    pub fn month_count(&self) -> i64 {
        (i64::from(self.months_before) + i64::from(self.months_after) + 1).max(0)
    }
}
