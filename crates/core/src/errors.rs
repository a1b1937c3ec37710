//! Core error types for the grid engine.
//!
//! Validation and policy errors are raised synchronously, before any grid
//! state is touched. Persistence errors arrive after the optimistic update and
//! are the only ones that require a rollback.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::periods::MonthKey;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the grid engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Edit not permitted: {0}")]
    Policy(#[from] PolicyError),

    #[error("Failed to save edit: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Validation errors for user input and row parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("'{0}' is not a number")]
    NotANumber(String),

    #[error("Amount must be a finite number")]
    NotFinite,

    #[error("Amount must not be negative (got {0})")]
    Negative(Decimal),

    #[error("Unknown line item '{0}'")]
    UnknownItem(String),

    #[error("Invalid month key '{0}'")]
    InvalidMonthKey(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Edits that are well-formed but not allowed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PolicyError {
    #[error("Month {month} is locked; only months after {current} can be edited")]
    LockedMonth { month: MonthKey, current: MonthKey },

    #[error("Cell {item_id}/{month} is still saving")]
    SaveInProgress { item_id: String, month: MonthKey },

    #[error("No cell is being edited")]
    NoActiveEdit,
}

/// Failures of the upstream row-update call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistenceError {
    /// The call did not resolve within the save timeout.
    #[error("Save timed out after {timeout_ms} ms (attempt {attempt})")]
    Timeout { timeout_ms: u64, attempt: u32 },

    /// A network or server-side failure that may succeed on a later attempt.
    #[error("Transient failure: {0}")]
    Transient(String),

    /// The backend refused the change. Retrying will not help.
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    /// Every permitted attempt failed.
    #[error("Gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: String },
}

/// Classification for retry policy on persistence errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Terminal failure, surface it immediately.
    Never,
    /// Transient failure, try again after the backoff delay.
    WithBackoff,
}

impl PersistenceError {
    /// Returns the retry classification for this error.
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Timeout { .. } | Self::Transient(_) => RetryClass::WithBackoff,
            Self::Rejected(_) | Self::Exhausted { .. } => RetryClass::Never,
        }
    }
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
