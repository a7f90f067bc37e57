//! PostgreSQL-backed `MonitoringRepository` implementation using Diesel ORM.
//!
//! The read model is assembled in one statement: in-progress executions are
//! joined with their template name and, via `DISTINCT ON`, with at most one
//! mark per execution. Ordering by `(marked_at DESC, seq DESC)` inside each
//! execution group makes that mark the newest one.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ExecutionStatus;
use crate::domain::ports::{ActivePatrol, MonitoringRepository, MonitoringRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CheckpointMarkRow, RoundExecutionRow, TemplateNameRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{row_to_execution, row_to_mark};
use super::schema::{checkpoint_marks, round_executions, round_templates};

type ActivePatrolRow = (RoundExecutionRow, TemplateNameRow, Option<CheckpointMarkRow>);

/// Diesel-backed implementation of the monitoring read-model port.
#[derive(Clone)]
pub struct DieselMonitoringRepository {
    pool: DbPool,
}

impl DieselMonitoringRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MonitoringRepositoryError {
    map_pool_error(error, MonitoringRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MonitoringRepositoryError {
    map_diesel_error(
        error,
        MonitoringRepositoryError::query,
        MonitoringRepositoryError::connection,
    )
}

fn convert_row(row: ActivePatrolRow) -> Result<ActivePatrol, MonitoringRepositoryError> {
    let (execution_row, template_row, mark_row) = row;
    let execution = row_to_execution(execution_row)
        .map_err(|err| MonitoringRepositoryError::query(err.to_string()))?;
    let latest_mark = mark_row
        .map(row_to_mark)
        .transpose()
        .map_err(|err| MonitoringRepositoryError::query(err.to_string()))?;

    Ok(ActivePatrol {
        execution,
        template_name: template_row.name,
        latest_mark,
    })
}

#[async_trait]
impl MonitoringRepository for DieselMonitoringRepository {
    async fn list_active(
        &self,
        installation_id: Option<Uuid>,
    ) -> Result<Vec<ActivePatrol>, MonitoringRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let in_progress = ExecutionStatus::InProgress.as_str();

        // DISTINCT ON requires the ordering to lead with the distinct
        // expression, so the newest-mark ordering sits behind the id.
        let selection = (
            RoundExecutionRow::as_select(),
            TemplateNameRow::as_select(),
            Option::<CheckpointMarkRow>::as_select(),
        );

        let rows: Vec<ActivePatrolRow> = match installation_id {
            Some(installation_id) => {
                round_executions::table
                    .inner_join(round_templates::table)
                    .left_join(checkpoint_marks::table)
                    .filter(round_executions::status.eq(in_progress))
                    .filter(round_executions::installation_id.eq(installation_id))
                    .distinct_on(round_executions::id)
                    .order((
                        round_executions::id,
                        checkpoint_marks::marked_at.desc(),
                        checkpoint_marks::seq.desc(),
                    ))
                    .select(selection)
                    .load(&mut conn)
                    .await
            }
            None => {
                round_executions::table
                    .inner_join(round_templates::table)
                    .left_join(checkpoint_marks::table)
                    .filter(round_executions::status.eq(in_progress))
                    .distinct_on(round_executions::id)
                    .order((
                        round_executions::id,
                        checkpoint_marks::marked_at.desc(),
                        checkpoint_marks::seq.desc(),
                    ))
                    .select(selection)
                    .load(&mut conn)
                    .await
            }
        }
        .map_err(diesel_error)?;

        rows.into_iter().map(convert_row).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row assembly.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    fn execution_row() -> RoundExecutionRow {
        RoundExecutionRow {
            id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            scheduled_at: Utc::now(),
            guard_id: Some(Uuid::new_v4()),
            status: "in_progress".into(),
            checkpoints_total: 5,
            checkpoints_completed: 2,
            trust_score: 100,
            started_at: Some(Utc::now()),
            completed_at: None,
            device: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let mapped = pool_error(PoolError::checkout("pool exhausted"));

        assert!(matches!(mapped, MonitoringRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn row_without_mark_assembles_patrol() {
        let row = (
            execution_row(),
            TemplateNameRow {
                name: "Night perimeter".into(),
            },
            None,
        );

        let patrol = convert_row(row).expect("assembly succeeds");
        assert_eq!(patrol.template_name, "Night perimeter");
        assert!(patrol.latest_mark.is_none());
        assert_eq!(patrol.execution.checkpoints_completed(), 2);
    }

    #[rstest]
    fn corrupt_execution_status_surfaces_as_query_error() {
        let mut bad = execution_row();
        bad.status = "walking_backwards".into();
        let row = (
            bad,
            TemplateNameRow {
                name: "Night perimeter".into(),
            },
            None,
        );

        let error = convert_row(row).expect_err("unknown status should fail");
        assert!(matches!(error, MonitoringRepositoryError::Query { .. }));
    }
}
