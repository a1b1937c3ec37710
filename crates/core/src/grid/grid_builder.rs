//! Turns fetched rows into a [`Grid`].

use log::{debug, warn};

use super::grid_layout::GridLayout;
use super::grid_model::{Grid, LineItem, RawRow};
use crate::columns::{extract_month_amounts, ColumnDialect};
use crate::constants::{DEFAULT_ID_COLUMN, DEFAULT_NAME_COLUMN};

/// Builds a grid with the default id/name columns and every column dialect.
pub fn build_grid<F>(rows: &[RawRow], group_key_of: F) -> Grid
where
    F: Fn(&RawRow) -> Option<String>,
{
    build(
        rows,
        DEFAULT_ID_COLUMN,
        DEFAULT_NAME_COLUMN,
        &ColumnDialect::ALL,
        group_key_of,
    )
}

pub fn build_grid_with_layout(rows: &[RawRow], layout: &GridLayout) -> Grid {
    build(
        rows,
        &layout.id_column,
        &layout.name_column,
        &layout.dialects,
        |row| layout.group_key.key_for(row),
    )
}

fn build<F>(
    rows: &[RawRow],
    id_column: &str,
    name_column: &str,
    dialects: &[ColumnDialect],
    group_key_of: F,
) -> Grid
where
    F: Fn(&RawRow) -> Option<String>,
{
    let mut items = Vec::with_capacity(rows.len());
    let mut conflicts = Vec::new();

    for (position, row) in rows.iter().enumerate() {
        let name = row.text(name_column);
        let Some(id) = row.text(id_column).or_else(|| name.clone()) else {
            warn!(
                "Row {} has neither '{}' nor '{}', skipping",
                position, id_column, name_column
            );
            continue;
        };

        let extracted = extract_month_amounts(&id, row.fields(), dialects);
        conflicts.extend(extracted.conflicts);

        let mut item = LineItem::new(
            id.clone(),
            name.unwrap_or_else(|| id.clone()),
            group_key_of(row).filter(|k| !k.trim().is_empty()),
        );
        item.dialect = extracted
            .columns
            .values()
            .map(|c| c.dialect)
            .min()
            .or_else(|| dialects.iter().copied().min());
        item.column_prefix = extracted.columns.values().find_map(|c| c.prefix.clone());
        item.columns = extracted
            .columns
            .into_iter()
            .map(|(month, column)| (month, column.name))
            .collect();
        item.amounts = extracted.amounts;
        items.push(item);
    }

    let grid = Grid::from_items(items, conflicts);
    debug!(
        "Built grid: {} items, {} groups, {} months",
        grid.len(),
        grid.groups.len(),
        grid.grand_totals.len()
    );
    grid
}
