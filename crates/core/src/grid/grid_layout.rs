//! Per-view configuration of the shared grid engine.
//!
//! Each page of the console differs only in which columns identify a row,
//! how rows map to groups, which month column dialects its endpoint uses and
//! whether past months are locked.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::grid_model::RawRow;
use crate::columns::ColumnDialect;
use crate::constants::{DEFAULT_ID_COLUMN, DEFAULT_NAME_COLUMN};
use crate::errors::{PolicyError, Result};
use crate::periods::MonthKey;

pub type GroupKeyFn = Arc<dyn Fn(&RawRow) -> Option<String> + Send + Sync>;

/// How a row's group key is found.
#[derive(Clone)]
pub enum GroupKeySource {
    /// Every row is ungrouped.
    None,
    /// Read from a column; blank values leave the row ungrouped.
    Column(String),
    /// Every row belongs to the same group.
    Fixed(String),
    Custom(GroupKeyFn),
}

impl GroupKeySource {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&RawRow) -> Option<String> + Send + Sync + 'static,
    {
        GroupKeySource::Custom(Arc::new(f))
    }

    pub fn key_for(&self, row: &RawRow) -> Option<String> {
        match self {
            GroupKeySource::None => None,
            GroupKeySource::Column(column) => row.text(column),
            GroupKeySource::Fixed(key) => Some(key.clone()),
            GroupKeySource::Custom(f) => f(row),
        }
    }
}

impl fmt::Debug for GroupKeySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKeySource::None => write!(f, "None"),
            GroupKeySource::Column(c) => f.debug_tuple("Column").field(c).finish(),
            GroupKeySource::Fixed(k) => f.debug_tuple("Fixed").field(k).finish(),
            GroupKeySource::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Which months a view lets the user edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditPolicy {
    /// Only months strictly after the current one: actuals are locked,
    /// the forecast is editable.
    #[default]
    FutureOnly,
    /// Any month.
    Open,
}

impl EditPolicy {
    pub fn check(&self, month: &MonthKey, current: &MonthKey) -> Result<()> {
        match self {
            EditPolicy::FutureOnly if month <= current => Err(PolicyError::LockedMonth {
                month: *month,
                current: *current,
            }
            .into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GridLayout {
    pub id_column: String,
    pub name_column: String,
    pub group_key: GroupKeySource,
    pub dialects: Vec<ColumnDialect>,
    pub edit_policy: EditPolicy,
}

impl Default for GridLayout {
    fn default() -> Self {
        GridLayout {
            id_column: DEFAULT_ID_COLUMN.to_string(),
            name_column: DEFAULT_NAME_COLUMN.to_string(),
            group_key: GroupKeySource::None,
            dialects: ColumnDialect::ALL.to_vec(),
            edit_policy: EditPolicy::FutureOnly,
        }
    }
}

impl GridLayout {
    pub fn with_group_column(mut self, column: impl Into<String>) -> Self {
        self.group_key = GroupKeySource::Column(column.into());
        self
    }

    pub fn with_group_key(mut self, source: GroupKeySource) -> Self {
        self.group_key = source;
        self
    }

    pub fn with_dialects(mut self, dialects: &[ColumnDialect]) -> Self {
        self.dialects = dialects.to_vec();
        self
    }

    pub fn with_edit_policy(mut self, policy: EditPolicy) -> Self {
        self.edit_policy = policy;
        self
    }
}

/// A fetchable page: the endpoint name plus its layout.
#[derive(Debug, Clone)]
pub struct GridView {
    pub name: String,
    pub layout: GridLayout,
}

impl GridView {
    pub fn new(name: impl Into<String>, layout: GridLayout) -> Self {
        GridView {
            name: name.into(),
            layout,
        }
    }
}
