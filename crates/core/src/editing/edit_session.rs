//! One grid plus the cell currently being edited.
//!
//! ```text
//! Display -> Editing -> Saving -> Display
//!                          \
//!                           -> EditError -> Editing
//! ```
//!
//! Only one cell is open at a time. Saving applies the edit to the grid
//! before the row-update call resolves and keeps a snapshot of the whole grid
//! until it does, so a failed save restores the exact prior state.

use std::sync::Arc;

use log::{debug, error};
use rust_decimal::Decimal;

use super::edit_model::{CellRef, CellState, Notification, NotificationKind, RowUpdate};
use super::editing_traits::RowUpdateRepositoryTrait;
use super::save_policy::{save_with_policy, SavePolicy};
use crate::errors::{Error, PersistenceError, PolicyError, Result, ValidationError};
use crate::grid::{parse_cell_input, EditPolicy, Grid};
use crate::periods::MonthKey;
use crate::utils::Clock;

#[derive(Debug, Clone)]
struct ActiveCell {
    cell: CellRef,
    state: CellState,
    /// Value when editing began, `None` if the month was empty.
    original: Option<Decimal>,
    /// Grid as it was before the optimistic update.
    snapshot: Option<Grid>,
}

pub struct EditSession {
    grid: Grid,
    policy: EditPolicy,
    clock: Arc<dyn Clock>,
    active: Option<ActiveCell>,
    notifications: Vec<Notification>,
    next_notification_id: u64,
}

impl std::fmt::Debug for EditSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditSession")
            .field("grid", &self.grid)
            .field("policy", &self.policy)
            .field("active", &self.active)
            .field("notifications", &self.notifications)
            .field("next_notification_id", &self.next_notification_id)
            .finish_non_exhaustive()
    }
}

impl EditSession {
    pub fn new(grid: Grid, policy: EditPolicy, clock: Arc<dyn Clock>) -> Self {
        EditSession {
            grid,
            policy,
            clock,
            active: None,
            notifications: Vec::new(),
            next_notification_id: 1,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn into_grid(self) -> Grid {
        self.grid
    }

    pub fn active_cell(&self) -> Option<&CellRef> {
        self.active.as_ref().map(|a| &a.cell)
    }

    pub fn state_of(&self, item_id: &str, month: &MonthKey) -> CellState {
        match &self.active {
            Some(a) if a.cell.item_id == item_id && a.cell.month == *month => a.state,
            _ => CellState::Display,
        }
    }

    /// Value the open cell held before editing began.
    pub fn original_value(&self) -> Option<Decimal> {
        self.active.as_ref().and_then(|a| a.original)
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Removes a notification. Returns false if it was already gone.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notifications.len();
        self.notifications.retain(|n| n.id != id);
        self.notifications.len() != before
    }

    /// Opens a cell for editing.
    ///
    /// An unsaved edit on another cell is abandoned. Opening is refused while
    /// a save is in flight and for months the policy locks.
    pub fn begin_edit(&mut self, item_id: &str, month: MonthKey) -> Result<()> {
        if let Some(err) = self.saving_error() {
            return self.fail(err, None);
        }
        let cell = CellRef {
            item_id: item_id.to_string(),
            month,
        };
        let Some(item) = self.grid.item(item_id) else {
            return self.fail(
                ValidationError::UnknownItem(item_id.to_string()).into(),
                Some(cell),
            );
        };
        let original = item.amounts.get(&month).copied();
        if let Err(err) = self.policy.check(&month, &self.clock.current_month()) {
            return self.fail(err, Some(cell));
        }

        if let Some(previous) = &self.active {
            if previous.cell != cell {
                debug!(
                    "Abandoning unsaved edit of {}/{}",
                    previous.cell.item_id, previous.cell.month
                );
            }
        }
        self.active = Some(ActiveCell {
            cell,
            state: CellState::Editing,
            original,
            snapshot: None,
        });
        Ok(())
    }

    /// Closes the open cell without touching the grid.
    pub fn cancel_edit(&mut self) -> Result<()> {
        if let Some(err) = self.saving_error() {
            return self.fail(err, None);
        }
        self.active = None;
        Ok(())
    }

    /// Leaves the error state after a failed save.
    pub fn resume_editing(&mut self) -> Result<()> {
        match self.active.as_mut() {
            Some(active) if active.state == CellState::EditError => {
                active.state = CellState::Editing;
                Ok(())
            }
            Some(active) if active.state == CellState::Editing => Ok(()),
            _ => Err(PolicyError::NoActiveEdit.into()),
        }
    }

    /// Validates `input`, applies it to the grid and moves to `Saving`.
    ///
    /// Returns the update to send upstream. On error nothing changes and the
    /// cell stays editable.
    pub fn stage_save(&mut self, input: &str) -> Result<RowUpdate> {
        if let Some(err) = self.saving_error() {
            return self.fail(err, None);
        }
        let editable = self
            .active
            .as_ref()
            .filter(|a| matches!(a.state, CellState::Editing | CellState::EditError))
            .map(|a| a.cell.clone());
        let Some(cell) = editable else {
            return self.fail(PolicyError::NoActiveEdit.into(), None);
        };

        let amount = match parse_cell_input(input) {
            Ok(amount) => amount,
            Err(err) => return self.fail(err, Some(cell)),
        };
        if let Err(err) = self.policy.check(&cell.month, &self.clock.current_month()) {
            return self.fail(err, Some(cell));
        }

        let snapshot = self.grid.clone();
        let change = match self.grid.apply_edit(&cell.item_id, cell.month, amount) {
            Ok(change) => change,
            Err(err) => return self.fail(err, Some(cell)),
        };

        if let Some(active) = self.active.as_mut() {
            active.state = CellState::Saving;
            active.snapshot = Some(snapshot);
        }

        Ok(RowUpdate {
            row_id: change.item_id,
            column: change.column,
            value: change.current,
        })
    }

    /// Resolves a staged save with the outcome of the row-update call.
    pub fn complete_save(&mut self, outcome: std::result::Result<(), PersistenceError>) -> Result<()> {
        let Some(active) = self.active.as_mut().filter(|a| a.state == CellState::Saving) else {
            return Err(PolicyError::NoActiveEdit.into());
        };

        match outcome {
            Ok(()) => {
                debug!("Saved {}/{}", active.cell.item_id, active.cell.month);
                self.active = None;
                Ok(())
            }
            Err(err) => {
                if let Some(snapshot) = active.snapshot.take() {
                    self.grid = snapshot;
                }
                active.state = CellState::EditError;
                let cell = active.cell.clone();
                error!(
                    "Saving {}/{} failed, rolled back: {}",
                    cell.item_id, cell.month, err
                );
                self.fail(err.into(), Some(cell))
            }
        }
    }

    /// Stages `input`, sends it through `repository` under `policy` and
    /// resolves the save.
    pub async fn submit(
        &mut self,
        repository: &dyn RowUpdateRepositoryTrait,
        policy: &SavePolicy,
        input: &str,
    ) -> Result<RowUpdate> {
        let update = self.stage_save(input)?;
        let outcome = save_with_policy(repository, &update, policy).await;
        self.complete_save(outcome)?;
        Ok(update)
    }

    fn saving_error(&self) -> Option<Error> {
        self.active
            .as_ref()
            .filter(|a| a.state == CellState::Saving)
            .map(|a| {
                Error::Policy(PolicyError::SaveInProgress {
                    item_id: a.cell.item_id.clone(),
                    month: a.cell.month,
                })
            })
    }

    fn fail<T>(&mut self, err: Error, cell: Option<CellRef>) -> Result<T> {
        let id = self.next_notification_id;
        self.next_notification_id += 1;
        self.notifications.push(Notification {
            id,
            kind: NotificationKind::from(&err),
            message: err.to_string(),
            cell,
        });
        Err(err)
    }
}
