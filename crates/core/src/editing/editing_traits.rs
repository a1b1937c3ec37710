use async_trait::async_trait;

use super::edit_model::RowUpdate;
use crate::errors::Result;

/// Row-update endpoint of the backend.
///
/// Implementations report backend refusals as
/// [`PersistenceError::Rejected`](crate::errors::PersistenceError::Rejected)
/// and network or 5xx failures as
/// [`PersistenceError::Transient`](crate::errors::PersistenceError::Transient)
/// so the save policy can tell them apart.
#[async_trait]
pub trait RowUpdateRepositoryTrait: Send + Sync {
    async fn update_row_field(&self, update: &RowUpdate) -> Result<()>;
}
