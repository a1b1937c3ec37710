//! Calendar month identifier.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};

/// Highest year a month key can carry; keeps the canonical form at four digits.
const MAX_YEAR: i32 = 9999;

/// A calendar month, canonically rendered as `YYYY_MM`.
///
/// Ordering is by year, then month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(0..=MAX_YEAR).contains(&year) || !(1..=12).contains(&month) {
            return Err(Error::Validation(ValidationError::InvalidMonthKey(format!(
                "{}_{}",
                year, month
            ))));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`. Day of month is ignored.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year().clamp(0, MAX_YEAR),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // year and month are validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    /// Shifts by `delta` calendar months. `None` when the result leaves the
    /// representable range.
    pub fn add_months(&self, delta: i32) -> Option<Self> {
        let first = self.first_day();
        let shifted = if delta >= 0 {
            first.checked_add_months(Months::new(delta.unsigned_abs()))?
        } else {
            first.checked_sub_months(Months::new(delta.unsigned_abs()))?
        };
        if !(0..=MAX_YEAR).contains(&shifted.year()) {
            return None;
        }
        Some(Self::from_date(shifted))
    }

    pub fn succ(&self) -> Option<Self> {
        self.add_months(1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}_{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = Error;

    /// Accepts `YYYY_MM` and `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::Validation(ValidationError::InvalidMonthKey(s.to_string()));
        let trimmed = s.trim();
        let (year, month) = trimmed
            .split_once('_')
            .or_else(|| trimmed.split_once('-'))
            .ok_or_else(invalid)?;
        if year.len() != 4 || month.is_empty() || month.len() > 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        MonthKey::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for MonthKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<MonthKey> for String {
    fn from(key: MonthKey) -> Self {
        key.to_string()
    }
}
