//! Edit session domain models.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::periods::MonthKey;

/// Lifecycle of the cell being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CellState {
    Display,
    Editing,
    /// Optimistically applied, waiting for the row-update call.
    Saving,
    /// The save failed and was rolled back; the cell is still editable.
    EditError,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellRef {
    pub item_id: String,
    pub month: MonthKey,
}

/// A single field change for the row-update endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowUpdate {
    pub row_id: String,
    pub column: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    Validation,
    Policy,
    Persistence,
    Other,
}

impl From<&Error> for NotificationKind {
    fn from(err: &Error) -> Self {
        match err {
            Error::Validation(_) => NotificationKind::Validation,
            Error::Policy(_) => NotificationKind::Policy,
            Error::Persistence(_) => NotificationKind::Persistence,
            _ => NotificationKind::Other,
        }
    }
}

/// A dismissible message shown to the user after a rejected or failed edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
    pub cell: Option<CellRef>,
}
