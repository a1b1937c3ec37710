//! Flowgrid Core - Month-column grids, rolling periods and cell editing.
//!
//! This crate holds the engine behind the cash-flow and payroll pages. It is
//! transport-agnostic: rows arrive through [`views::RowFetchRepositoryTrait`]
//! and edits leave through [`editing::RowUpdateRepositoryTrait`], both
//! implemented by the host application.

pub mod columns;
pub mod constants;
pub mod editing;
pub mod errors;
pub mod grid;
pub mod periods;
pub mod settings;
pub mod utils;
pub mod views;

// Re-export the types most callers need
pub use editing::{EditSession, RowUpdate};
pub use grid::{Grid, GridLayout, GridView, LineItem};
pub use periods::{MonthKey, Period, PeriodWindow};
pub use settings::GridSettings;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
