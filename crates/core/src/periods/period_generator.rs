//! Rolling month window and its partition into display periods.

use chrono::NaiveDate;
use log::debug;

use super::month_key::MonthKey;
use super::periods_model::Period;
use crate::constants::DEFAULT_PERIOD_SIZE;

/// Every month from `anchor − months_before` to `anchor + months_after`,
/// inclusive, in ascending order.
///
/// The anchor is the month of `anchor_date`; the day is ignored so the window
/// is stable for a whole calendar month. A window with fewer than one month
/// yields an empty list.
pub fn generate_month_keys(
    anchor_date: NaiveDate,
    months_before: i32,
    months_after: i32,
) -> Vec<MonthKey> {
    let length = i64::from(months_before) + i64::from(months_after) + 1;
    if length < 1 {
        return Vec::new();
    }

    let anchor = MonthKey::from_date(anchor_date);
    let Some(start) = months_before
        .checked_neg()
        .and_then(|delta| anchor.add_months(delta))
    else {
        debug!(
            "Window start {} months before {} is out of range",
            months_before, anchor
        );
        return Vec::new();
    };

    let mut months = Vec::with_capacity(length.min(12 * 200) as usize);
    let mut current = start;
    months.push(current);
    for _ in 1..length {
        match current.succ() {
            Some(next) => {
                months.push(next);
                current = next;
            }
            None => break,
        }
    }
    months
}

/// Splits the rolling window into periods of `period_size` months.
///
/// The last period is shorter when the window length is not a multiple of
/// `period_size`. A `period_size` of zero falls back to the default size.
pub fn generate_periods(
    anchor_date: NaiveDate,
    months_before: i32,
    months_after: i32,
    period_size: usize,
) -> Vec<Period> {
    let size = if period_size == 0 {
        debug!(
            "Period size 0 requested, using default of {}",
            DEFAULT_PERIOD_SIZE
        );
        DEFAULT_PERIOD_SIZE
    } else {
        period_size
    };

    generate_month_keys(anchor_date, months_before, months_after)
        .chunks(size)
        .enumerate()
        .map(|(index, chunk)| Period::new(index, chunk.to_vec()))
        .collect()
}

/// Index of the period containing `month`, e.g. the tab a page opens on.
pub fn current_period_index(periods: &[Period], month: &MonthKey) -> Option<usize> {
    periods.iter().position(|p| p.contains(month))
}
