use async_trait::async_trait;

use crate::editing::{EditSession, RowUpdate};
use crate::errors::Result;
use crate::grid::{GridView, RowSet};
use crate::periods::Period;

/// Row-fetch endpoint of the backend ("table/view data").
#[async_trait]
pub trait RowFetchRepositoryTrait: Send + Sync {
    async fn fetch_rows(&self, view: &str) -> Result<RowSet>;
}

/// Trait for grid view operations
#[async_trait]
pub trait GridServiceTrait: Send + Sync {
    /// Display periods of the rolling window anchored on today.
    fn periods(&self) -> Vec<Period>;

    /// Index of the period that contains the current month.
    fn current_period_index(&self) -> Option<usize>;

    /// Fetches a view and opens an edit session over its grid.
    async fn load_grid(&self, view: &GridView) -> Result<EditSession>;

    /// Saves the value typed into the session's open cell.
    async fn save_edit(&self, session: &mut EditSession, input: &str) -> Result<RowUpdate>;
}
