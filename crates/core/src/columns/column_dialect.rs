//! Recognized naming conventions for month columns.
//!
//! Fetched rows name their month columns in one of several historical styles.
//! Each style is a [`ColumnDialect`]; declaration order is precedence order,
//! highest first. When one row yields the same month through two columns, the
//! column whose dialect ranks higher wins and the clash is reported.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use log::warn;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::cell_value::parse_cell_value;
use crate::periods::MonthKey;

/// Prefix used when a prefixed column has to be synthesized.
const DEFAULT_PREFIX: &str = "amount";

lazy_static! {
    /// `amount_2025_06`, `monto_comision_2025_06`
    static ref PREFIXED_REGEX: Regex =
        Regex::new(r"^(?i)([a-z][a-z0-9]*(?:_[a-z][a-z0-9]*)*)_(\d{4})_(\d{1,2})$")
            .expect("Invalid regex pattern");

    /// `2025_06`
    static ref CANONICAL_REGEX: Regex =
        Regex::new(r"^(\d{4})_(\d{1,2})$").expect("Invalid regex pattern");

    /// `2025-06`
    static ref ISO_DASHED_REGEX: Regex =
        Regex::new(r"^(\d{4})-(\d{1,2})$").expect("Invalid regex pattern");

    /// `enero_2025`, `Ene 2025`, `sep-25`, `March2026`
    static ref MONTH_NAME_REGEX: Regex =
        Regex::new(r"^(?i)([a-z\p{L}]+)[ _\-]?(\d{4}|\d{2})$").expect("Invalid regex pattern");
}

/// Month names in the spelling used when a column has to be synthesized.
const SPANISH_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "enero" | "ene" | "january" | "jan" => 1,
        "febrero" | "feb" | "february" => 2,
        "marzo" | "mar" | "march" => 3,
        "abril" | "abr" | "april" | "apr" => 4,
        "mayo" | "may" => 5,
        "junio" | "jun" | "june" => 6,
        "julio" | "jul" | "july" => 7,
        "agosto" | "ago" | "august" | "aug" => 8,
        "septiembre" | "setiembre" | "sep" | "sept" | "set" | "september" => 9,
        "octubre" | "oct" | "october" => 10,
        "noviembre" | "nov" | "november" => 11,
        "diciembre" | "dic" | "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// A naming convention for month columns, in precedence order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColumnDialect {
    /// `<prefix>_YYYY_MM`
    Prefixed,
    /// `YYYY_MM`
    Canonical,
    /// `YYYY-MM`
    IsoDashed,
    /// Spanish or English month name followed by a 2- or 4-digit year.
    MonthName,
}

impl ColumnDialect {
    /// All dialects, highest precedence first.
    pub const ALL: [ColumnDialect; 4] = [
        ColumnDialect::Prefixed,
        ColumnDialect::Canonical,
        ColumnDialect::IsoDashed,
        ColumnDialect::MonthName,
    ];

    /// Tries to read `name` as a column of this dialect.
    pub fn parse(&self, name: &str) -> Option<MonthColumn> {
        let name = name.trim();
        let (month, prefix) = match self {
            ColumnDialect::Prefixed => {
                let caps = PREFIXED_REGEX.captures(name)?;
                let month = month_from_parts(&caps[2], &caps[3])?;
                (month, Some(caps[1].to_string()))
            }
            ColumnDialect::Canonical => {
                let caps = CANONICAL_REGEX.captures(name)?;
                (month_from_parts(&caps[1], &caps[2])?, None)
            }
            ColumnDialect::IsoDashed => {
                let caps = ISO_DASHED_REGEX.captures(name)?;
                (month_from_parts(&caps[1], &caps[2])?, None)
            }
            ColumnDialect::MonthName => {
                let caps = MONTH_NAME_REGEX.captures(name)?;
                let month = month_number(&caps[1])?;
                let year: i32 = caps[2].parse().ok()?;
                let year = if caps[2].len() == 2 { 2000 + year } else { year };
                (MonthKey::new(year, month).ok()?, None)
            }
        };
        Some(MonthColumn {
            name: name.to_string(),
            month,
            dialect: *self,
            prefix,
        })
    }

    /// Renders the column name this dialect uses for `month`.
    pub fn format(&self, month: &MonthKey, prefix: Option<&str>) -> String {
        match self {
            ColumnDialect::Prefixed => {
                format!("{}_{}", prefix.unwrap_or(DEFAULT_PREFIX), month)
            }
            ColumnDialect::Canonical => month.to_string(),
            ColumnDialect::IsoDashed => format!("{:04}-{:02}", month.year(), month.month()),
            ColumnDialect::MonthName => format!(
                "{}_{}",
                SPANISH_MONTHS[(month.month() as usize).saturating_sub(1) % 12],
                month.year()
            ),
        }
    }
}

fn month_from_parts(year: &str, month: &str) -> Option<MonthKey> {
    MonthKey::new(year.parse().ok()?, month.parse().ok()?).ok()
}

/// A column recognized as holding one month's amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthColumn {
    pub name: String,
    pub month: MonthKey,
    pub dialect: ColumnDialect,
    pub prefix: Option<String>,
}

/// Reads `name` with the first matching dialect out of `accepted`, trying them
/// in precedence order regardless of how `accepted` is ordered.
pub fn parse_month_column(name: &str, accepted: &[ColumnDialect]) -> Option<MonthColumn> {
    ColumnDialect::ALL
        .iter()
        .filter(|d| accepted.contains(d))
        .find_map(|d| d.parse(name))
}

/// Two columns of one row that name the same month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConflict {
    pub row_id: String,
    pub month: MonthKey,
    pub kept_column: String,
    pub ignored_column: String,
}

/// Month amounts read out of one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowAmounts {
    pub amounts: BTreeMap<MonthKey, Decimal>,
    pub columns: BTreeMap<MonthKey, MonthColumn>,
    pub conflicts: Vec<ColumnConflict>,
}

/// Extracts every recognized month column of a row.
///
/// Columns are visited in source order, so between two columns of the same
/// dialect the earlier one is kept. Unrecognized columns are ignored. Null or empty values leave the month
/// absent. Values that are not numbers are skipped with a warning.
pub fn extract_month_amounts<'a, I>(row_id: &str, fields: I, accepted: &[ColumnDialect]) -> RowAmounts
where
    I: IntoIterator<Item = (&'a String, &'a Value)>,
{
    let mut out = RowAmounts::default();

    for (name, value) in fields {
        let Some(column) = parse_month_column(name, accepted) else {
            continue;
        };

        let amount = match parse_cell_value(value) {
            Ok(Some(amount)) => amount,
            Ok(None) => continue,
            Err(e) => {
                warn!("Row '{}': skipping column '{}': {}", row_id, name, e);
                continue;
            }
        };

        let month = column.month;
        match out.columns.get(&month) {
            Some(existing) if existing.dialect <= column.dialect => {
                warn!(
                    "Row '{}': columns '{}' and '{}' both map to {}, keeping '{}'",
                    row_id, existing.name, column.name, month, existing.name
                );
                out.conflicts.push(ColumnConflict {
                    row_id: row_id.to_string(),
                    month,
                    kept_column: existing.name.clone(),
                    ignored_column: column.name.clone(),
                });
            }
            Some(existing) => {
                warn!(
                    "Row '{}': columns '{}' and '{}' both map to {}, keeping '{}'",
                    row_id, existing.name, column.name, month, column.name
                );
                out.conflicts.push(ColumnConflict {
                    row_id: row_id.to_string(),
                    month,
                    kept_column: column.name.clone(),
                    ignored_column: existing.name.clone(),
                });
                out.amounts.insert(month, amount);
                out.columns.insert(month, column);
            }
            None => {
                out.amounts.insert(month, amount);
                out.columns.insert(month, column);
            }
        }
    }

    out
}
