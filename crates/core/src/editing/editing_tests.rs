//! Tests for the edit session state machine and the save policy.

#[cfg(test)]
mod tests {
    use crate::editing::{
        save_with_policy, CellState, EditSession, NotificationKind, RowUpdate,
        RowUpdateRepositoryTrait, SavePolicy,
    };
    use crate::errors::{Error, PersistenceError, PolicyError, Result};
    use crate::grid::{build_grid, EditPolicy, Grid, RawRow};
    use crate::periods::MonthKey;
    use crate::utils::FixedClock;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    // --- Mock row-update endpoint ---
    #[derive(Clone, Default)]
    struct MockRowUpdateRepository {
        responses: Arc<Mutex<VecDeque<Result<()>>>>,
        calls: Arc<Mutex<Vec<RowUpdate>>>,
        hang: bool,
    }

    impl MockRowUpdateRepository {
        fn new() -> Self {
            Self::default()
        }

        fn hanging() -> Self {
            Self {
                hang: true,
                ..Self::default()
            }
        }

        fn respond_with(self, response: Result<()>) -> Self {
            self.responses.lock().unwrap().push_back(response);
            self
        }

        fn calls(&self) -> Vec<RowUpdate> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RowUpdateRepositoryTrait for MockRowUpdateRepository {
        async fn update_row_field(&self, update: &RowUpdate) -> Result<()> {
            self.calls.lock().unwrap().push(update.clone());
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            let next = self.responses.lock().unwrap().pop_front();
            next.unwrap_or(Ok(()))
        }
    }

    fn key(s: &str) -> MonthKey {
        s.parse().unwrap()
    }

    fn grid() -> Grid {
        let rows: Vec<RawRow> = vec![
            json!({"id": "1", "concepto": "Comision captador Norte", "grupo": "clientes_captados", "amount_2025_06": 500}),
            json!({"id": "2", "concepto": "Comision captador Sur", "grupo": "clientes_captados", "amount_2025_06": 100}),
        ]
        .into_iter()
        .map(|v| RawRow(v.as_object().cloned().unwrap()))
        .collect();
        build_grid(&rows, |r| r.text("grupo"))
    }

    fn session() -> EditSession {
        let clock = Arc::new(FixedClock::at_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()));
        EditSession::new(grid(), EditPolicy::FutureOnly, clock)
    }

    fn fast_policy() -> SavePolicy {
        SavePolicy {
            timeout: Duration::from_millis(200),
            max_attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }

    // ==================== State machine ====================

    #[test]
    fn test_begin_edit_snapshots_prior_value() {
        let mut session = session();
        session.begin_edit("1", key("2025_06")).unwrap();
        assert_eq!(session.state_of("1", &key("2025_06")), CellState::Editing);
        assert_eq!(session.original_value(), Some(dec!(500)));
        assert_eq!(session.state_of("2", &key("2025_06")), CellState::Display);
    }

    #[test]
    fn test_cancel_leaves_grid_untouched() {
        let mut session = session();
        let before = session.grid().clone();
        session.begin_edit("1", key("2025_06")).unwrap();
        session.cancel_edit().unwrap();
        assert_eq!(session.state_of("1", &key("2025_06")), CellState::Display);
        assert_eq!(session.grid(), &before);
    }

    #[test]
    fn test_begin_edit_on_locked_month_is_rejected() {
        let mut session = session();
        let err = session.begin_edit("1", key("2025_03")).unwrap_err();
        assert!(matches!(err, Error::Policy(PolicyError::LockedMonth { .. })));
        assert!(session.active_cell().is_none());
        assert_eq!(session.notifications().len(), 1);
        assert_eq!(session.notifications()[0].kind, NotificationKind::Policy);
    }

    #[test]
    fn test_stage_save_applies_optimistically() {
        let mut session = session();
        session.begin_edit("1", key("2025_06")).unwrap();
        let update = session.stage_save("750").unwrap();

        assert_eq!(
            update,
            RowUpdate {
                row_id: "1".to_string(),
                column: "amount_2025_06".to_string(),
                value: dec!(750),
            }
        );
        assert_eq!(session.state_of("1", &key("2025_06")), CellState::Saving);
        assert_eq!(session.grid().grand_total_for(&key("2025_06")), dec!(850));
        session.grid().verify_totals().unwrap();
    }

    #[test]
    fn test_invalid_input_keeps_cell_editing() {
        let mut session = session();
        let before = session.grid().clone();
        session.begin_edit("1", key("2025_06")).unwrap();

        let err = session.stage_save("-20").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(session.state_of("1", &key("2025_06")), CellState::Editing);
        assert_eq!(session.grid(), &before);
        assert_eq!(session.notifications()[0].kind, NotificationKind::Validation);
    }

    #[test]
    fn test_empty_input_means_zero() {
        let mut session = session();
        session.begin_edit("2", key("2025_06")).unwrap();
        let update = session.stage_save("").unwrap();
        assert_eq!(update.value, dec!(0));
        assert_eq!(session.grid().grand_total_for(&key("2025_06")), dec!(500));
    }

    #[test]
    fn test_saving_blocks_other_cells() {
        let mut session = session();
        session.begin_edit("1", key("2025_06")).unwrap();
        session.stage_save("600").unwrap();

        let err = session.begin_edit("2", key("2025_07")).unwrap_err();
        assert!(matches!(err, Error::Policy(PolicyError::SaveInProgress { .. })));
        assert!(session.cancel_edit().is_err());
        assert_eq!(session.active_cell().unwrap().item_id, "1");
    }

    #[test]
    fn test_complete_save_success_returns_to_display() {
        let mut session = session();
        session.begin_edit("1", key("2025_06")).unwrap();
        session.stage_save("750").unwrap();
        session.complete_save(Ok(())).unwrap();

        assert!(session.active_cell().is_none());
        assert_eq!(session.state_of("1", &key("2025_06")), CellState::Display);
        assert_eq!(
            session.grid().item("1").unwrap().amount(&key("2025_06")),
            dec!(750)
        );
    }

    #[test]
    fn test_complete_save_failure_rolls_back_exactly() {
        let mut session = session();
        let before = session.grid().clone();
        session.begin_edit("1", key("2025_09")).unwrap();
        session.stage_save("42").unwrap();
        assert_ne!(session.grid(), &before);

        let err = session
            .complete_save(Err(PersistenceError::Rejected("read only".to_string())))
            .unwrap_err();
        assert!(matches!(err, Error::Persistence(_)));
        assert_eq!(session.grid(), &before);
        assert_eq!(session.state_of("1", &key("2025_09")), CellState::EditError);

        let notification = session.notifications().last().unwrap().clone();
        assert_eq!(notification.kind, NotificationKind::Persistence);
        assert!(session.dismiss(notification.id));
        assert!(!session.dismiss(notification.id));

        session.resume_editing().unwrap();
        assert_eq!(session.state_of("1", &key("2025_09")), CellState::Editing);
        assert!(session.stage_save("43").is_ok());
    }

    #[test]
    fn test_complete_save_without_staging_is_an_error() {
        let mut session = session();
        assert_eq!(
            session.complete_save(Ok(())).unwrap_err(),
            Error::Policy(PolicyError::NoActiveEdit)
        );
        assert!(session.stage_save("1").is_err());
    }

    // ==================== submit / save policy ====================

    #[tokio::test]
    async fn test_submit_persists_one_update() {
        let repository = MockRowUpdateRepository::new();
        let mut session = session();
        session.begin_edit("1", key("2025_06")).unwrap();

        let update = session
            .submit(&repository, &fast_policy(), "750")
            .await
            .unwrap();

        assert_eq!(repository.calls(), vec![update]);
        assert_eq!(session.grid().grand_total_for(&key("2025_06")), dec!(850));
        assert!(session.active_cell().is_none());
    }

    #[tokio::test]
    async fn test_submit_retries_transient_failures() {
        let repository = MockRowUpdateRepository::new()
            .respond_with(Err(PersistenceError::Transient("503".to_string()).into()))
            .respond_with(Err(Error::Repository("connection reset".to_string())))
            .respond_with(Ok(()));
        let mut session = session();
        session.begin_edit("2", key("2025_06")).unwrap();

        session
            .submit(&repository, &fast_policy(), "300")
            .await
            .unwrap();
        assert_eq!(repository.calls().len(), 3);
        assert_eq!(session.grid().grand_total_for(&key("2025_06")), dec!(800));
    }

    #[tokio::test]
    async fn test_submit_rejection_is_not_retried_and_rolls_back() {
        let repository = MockRowUpdateRepository::new()
            .respond_with(Err(PersistenceError::Rejected("forbidden".to_string()).into()));
        let mut session = session();
        let before = session.grid().clone();
        session.begin_edit("2", key("2025_06")).unwrap();

        let err = session
            .submit(&repository, &fast_policy(), "300")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            Error::Persistence(PersistenceError::Rejected("forbidden".to_string()))
        );
        assert_eq!(repository.calls().len(), 1);
        assert_eq!(session.grid(), &before);
        assert_eq!(session.state_of("2", &key("2025_06")), CellState::EditError);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_save_times_out_and_gives_up() {
        let repository = MockRowUpdateRepository::hanging();
        let mut session = session();
        let before = session.grid().clone();
        session.begin_edit("1", key("2025_06")).unwrap();

        let err = session
            .submit(&repository, &fast_policy(), "900")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Persistence(PersistenceError::Exhausted { attempts: 3, .. })
        ));
        assert_eq!(repository.calls().len(), 3);
        assert_eq!(session.grid(), &before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_attempt_timeout() {
        let repository = MockRowUpdateRepository::hanging();
        let update = RowUpdate {
            row_id: "1".to_string(),
            column: "2025_07".to_string(),
            value: dec!(1),
        };
        let policy = SavePolicy {
            max_attempts: 1,
            ..fast_policy()
        };
        let err = save_with_policy(&repository, &update, &policy)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            PersistenceError::Exhausted {
                attempts: 1,
                last: "Save timed out after 200 ms (attempt 1)".to_string(),
            }
        );
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = SavePolicy {
            backoff: Duration::from_millis(100),
            ..SavePolicy::default()
        };
        assert_eq!(policy.backoff_for(1), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(50), Duration::from_millis(6400));
    }
}
