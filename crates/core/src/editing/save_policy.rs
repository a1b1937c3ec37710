//! Bounded timeout and retry around the row-update call.

use std::time::Duration;

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use tokio::time::{sleep, timeout};

use super::edit_model::RowUpdate;
use super::editing_traits::RowUpdateRepositoryTrait;
use crate::constants::{
    DEFAULT_MAX_SAVE_ATTEMPTS, DEFAULT_RETRY_BACKOFF_MS, DEFAULT_SAVE_TIMEOUT_MS,
};
use crate::errors::{Error, PersistenceError, RetryClass};

/// Largest doubling applied to the backoff delay.
const MAX_BACKOFF_SHIFT: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePolicy {
    pub timeout: Duration,
    /// Attempts including the first one. Zero behaves like one.
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for SavePolicy {
    fn default() -> Self {
        SavePolicy {
            timeout: Duration::from_millis(DEFAULT_SAVE_TIMEOUT_MS),
            max_attempts: DEFAULT_MAX_SAVE_ATTEMPTS,
            backoff: Duration::from_millis(DEFAULT_RETRY_BACKOFF_MS),
        }
    }
}

impl SavePolicy {
    /// Delay before the attempt following `attempt` (1-based).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(MAX_BACKOFF_SHIFT);
        self.backoff.saturating_mul(1u32 << shift)
    }
}

fn into_persistence_error(err: Error) -> PersistenceError {
    match err {
        Error::Persistence(e) => e,
        Error::Repository(message) => PersistenceError::Transient(message),
        other => PersistenceError::Rejected(other.to_string()),
    }
}

/// Sends `update`, bounding each attempt by `policy.timeout` and retrying
/// transient failures with exponential backoff.
pub async fn save_with_policy(
    repository: &dyn RowUpdateRepositoryTrait,
    update: &RowUpdate,
    policy: &SavePolicy,
) -> Result<(), PersistenceError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        debug!(
            "Saving {}.{} = {} (attempt {}/{})",
            update.row_id, update.column, update.value, attempt, max_attempts
        );

        let failure = match timeout(policy.timeout, repository.update_row_field(update)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => into_persistence_error(e),
            Err(_) => PersistenceError::Timeout {
                timeout_ms: policy.timeout.as_millis() as u64,
                attempt,
            },
        };

        if failure.retry_class() == RetryClass::Never {
            return Err(failure);
        }
        if attempt >= max_attempts {
            return Err(PersistenceError::Exhausted {
                attempts: attempt,
                last: failure.to_string(),
            });
        }

        let delay = policy.backoff_for(attempt);
        warn!(
            "Saving {}.{} failed ({}), retrying in {}ms",
            update.row_id,
            update.column,
            failure,
            delay.as_millis()
        );
        sleep(delay).await;
    }
}
