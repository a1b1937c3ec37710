//! Grid module - line items, groups and cascading totals.

mod grid_builder;
mod grid_edit;
mod grid_layout;
mod grid_model;


pub use grid_builder::{build_grid, build_grid_with_layout};
pub use grid_edit::{edit_cell, edit_cell_with_policy, parse_cell_input, validate_amount};
pub use grid_layout::{EditPolicy, GridLayout, GridView, GroupKeyFn, GroupKeySource};
pub use grid_model::{
    CellChange, Grid, Group, GroupSlice, LineItem, PeriodSummary, RawRow, RowSet, RowSlice,
};
