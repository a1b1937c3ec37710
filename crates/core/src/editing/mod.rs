//! Editing module - per-cell edit state, optimistic saves and rollback.

mod edit_model;
mod edit_session;
mod editing_traits;
mod save_policy;

#[cfg(test)]
mod editing_tests;

pub use edit_model::{CellRef, CellState, Notification, NotificationKind, RowUpdate};
pub use edit_session::EditSession;
pub use editing_traits::RowUpdateRepositoryTrait;
pub use save_policy::{save_with_policy, SavePolicy};
