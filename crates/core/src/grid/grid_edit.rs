//! Single-cell edits and the total cascade they trigger.

use log::debug;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use super::grid_layout::EditPolicy;
use super::grid_model::{CellChange, Grid};
use crate::columns::parse_amount_str;
use crate::errors::{Error, Result, ValidationError};
use crate::periods::MonthKey;
use crate::utils::Clock;

/// Checks a numeric cell value: finite and not negative.
pub fn validate_amount(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite.into());
    }
    let amount = Decimal::from_f64(value)
        .ok_or_else(|| ValidationError::InvalidInput(format!("{} is out of range", value)))?;
    check_non_negative(amount)
}

/// Parses what the user typed into a cell. An empty cell means zero.
pub fn parse_cell_input(input: &str) -> Result<Decimal> {
    match parse_amount_str(input) {
        Ok(Some(amount)) => check_non_negative(amount),
        Ok(None) => Ok(Decimal::ZERO),
        Err(_) => Err(ValidationError::NotANumber(input.trim().to_string()).into()),
    }
}

fn check_non_negative(amount: Decimal) -> Result<Decimal> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::Negative(amount).into());
    }
    if amount.is_zero() {
        return Ok(Decimal::ZERO);
    }
    Ok(amount)
}

impl Grid {
    /// Sets one cell and updates every total that depends on it.
    ///
    /// Only the item's row total, its group's month and overall totals, and
    /// the grand total for that month and overall are touched. The amount is
    /// assumed valid; policy checks belong to the caller.
    pub fn apply_edit(&mut self, item_id: &str, month: MonthKey, value: Decimal) -> Result<CellChange> {
        let position = *self
            .index
            .get(item_id)
            .ok_or_else(|| Error::Validation(ValidationError::UnknownItem(item_id.to_string())))?;
        let item = &mut self.items[position];

        let column = item.column_for(&month);
        item.columns.entry(month).or_insert_with(|| column.clone());

        let previous = item.amounts.insert(month, value);
        let delta = value - previous.unwrap_or(Decimal::ZERO);
        item.total += delta;
        let group_key = item.group_key.clone();

        if let Some(group) = group_key.as_ref().and_then(|k| self.groups.get_mut(k)) {
            *group.monthly_totals.entry(month).or_insert(Decimal::ZERO) += delta;
            group.total += delta;
            *self.grand_totals.entry(month).or_insert(Decimal::ZERO) += delta;
            self.grand_total += delta;
        }

        debug!(
            "Edited {}/{}: {:?} -> {} (delta {})",
            item_id, month, previous, value, delta
        );

        Ok(CellChange {
            item_id: item_id.to_string(),
            month,
            column,
            previous,
            current: value,
            delta,
            group_key,
        })
    }
}

/// Returns a copy of `grid` with one cell changed, under the future-only
/// policy.
pub fn edit_cell(
    grid: &Grid,
    item_id: &str,
    month: MonthKey,
    new_value: f64,
    clock: &dyn Clock,
) -> Result<Grid> {
    edit_cell_with_policy(grid, item_id, month, new_value, EditPolicy::FutureOnly, clock)
}

/// Like [`edit_cell`] with an explicit policy. Nothing is copied or changed
/// when the edit is rejected.
pub fn edit_cell_with_policy(
    grid: &Grid,
    item_id: &str,
    month: MonthKey,
    new_value: f64,
    policy: EditPolicy,
    clock: &dyn Clock,
) -> Result<Grid> {
    let amount = validate_amount(new_value)?;
    if grid.item(item_id).is_none() {
        return Err(ValidationError::UnknownItem(item_id.to_string()).into());
    }
    policy.check(&month, &clock.current_month())?;

    let mut next = grid.clone();
    next.apply_edit(item_id, month, amount)?;
    Ok(next)
}
