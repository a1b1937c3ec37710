//! Columns module - month column dialects and cell value parsing.

mod cell_value;
mod column_dialect;

#[cfg(test)]
mod columns_tests;

pub use cell_value::{parse_amount_str, parse_cell_value};
pub use column_dialect::{
    extract_month_amounts, parse_month_column, ColumnConflict, ColumnDialect, MonthColumn,
    RowAmounts,
};
