use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, error};

use super::views_traits::{GridServiceTrait, RowFetchRepositoryTrait};
use crate::editing::{EditSession, RowUpdate, RowUpdateRepositoryTrait};
use crate::errors::{Error, Result};
use crate::grid::{build_grid_with_layout, GridView};
use crate::periods::{current_period_index, Period};
use crate::settings::GridSettings;
use crate::utils::{Clock, ZonedClock};

pub struct GridService {
    fetch_repository: Arc<dyn RowFetchRepositoryTrait>,
    update_repository: Arc<dyn RowUpdateRepositoryTrait>,
    clock: Arc<dyn Clock>,
    settings: GridSettings,
}

impl GridService {
    pub fn new(
        fetch_repository: Arc<dyn RowFetchRepositoryTrait>,
        update_repository: Arc<dyn RowUpdateRepositoryTrait>,
        clock: Arc<dyn Clock>,
        settings: GridSettings,
    ) -> Result<Self> {
        settings.validate()?;
        // A configured timezone overrides the clock's own
        let clock: Arc<dyn Clock> = if settings.timezone.is_some() {
            Arc::new(ZonedClock::new(clock, settings.tz()))
        } else {
            clock
        };
        Ok(GridService {
            fetch_repository,
            update_repository,
            clock,
            settings,
        })
    }

    pub fn settings(&self) -> &GridSettings {
        &self.settings
    }
}

#[async_trait]
impl GridServiceTrait for GridService {
    fn periods(&self) -> Vec<Period> {
        self.settings.window().periods_from(self.clock.as_ref())
    }

    fn current_period_index(&self) -> Option<usize> {
        current_period_index(&self.periods(), &self.clock.current_month())
    }

    async fn load_grid(&self, view: &GridView) -> Result<EditSession> {
        debug!("Loading grid view '{}'", view.name);

        let row_set = match self.fetch_repository.fetch_rows(&view.name).await {
            Ok(rows) => rows,
            Err(e) => {
                error!("Error fetching rows for view '{}': {:?}", view.name, e);
                return Err(match e {
                    Error::Repository(_) => e,
                    other => Error::Repository(other.to_string()),
                });
            }
        };

        let grid = build_grid_with_layout(&row_set.rows, &view.layout);
        Ok(EditSession::new(
            grid,
            view.layout.edit_policy,
            self.clock.clone(),
        ))
    }

    async fn save_edit(&self, session: &mut EditSession, input: &str) -> Result<RowUpdate> {
        let policy = self.settings.save_policy();
        session
            .submit(self.update_repository.as_ref(), &policy, input)
            .await
    }
}
