//! PostgreSQL-backed `ExecutionRepository` implementation using Diesel ORM.
//!
//! Slot idempotency and lifecycle races are settled in SQL: inserts lean on
//! the `(schedule_id, scheduled_at)` unique constraint with `ON CONFLICT DO
//! NOTHING`, and start/finalize run as single guarded `UPDATE .. RETURNING`
//! statements so concurrent writers cannot interleave between a read and a
//! write.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{
    ExecutionCompletion, ExecutionRepository, ExecutionRepositoryError, ExecutionStart,
    InsertPendingOutcome,
};
use crate::domain::{ExecutionStatus, RoundExecution};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{
    ExecutionCompletionChangeset, ExecutionStartChangeset, NewRoundExecutionRow, RoundExecutionRow,
};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{device_to_json, row_to_execution};
use super::schema::round_executions;

/// Status labels that still accept start, mark, and complete activity.
const ACTIVE_STATUSES: [&str; 3] = ["pending", "in_progress", "incomplete"];

/// Diesel-backed implementation of the round execution repository port.
#[derive(Clone)]
pub struct DieselExecutionRepository {
    pool: DbPool,
}

impl DieselExecutionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ExecutionRepositoryError {
    map_pool_error(error, ExecutionRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ExecutionRepositoryError {
    map_diesel_error(
        error,
        ExecutionRepositoryError::query,
        ExecutionRepositoryError::connection,
    )
}

fn conversion_error(error: super::row_conversions::RowConversionError) -> ExecutionRepositoryError {
    ExecutionRepositoryError::query(error.to_string())
}

fn encode_device(
    execution: &RoundExecution,
) -> Result<Option<serde_json::Value>, ExecutionRepositoryError> {
    device_to_json(execution.device())
        .map_err(|err| ExecutionRepositoryError::query(err.to_string()))
}

#[async_trait]
impl ExecutionRepository for DieselExecutionRepository {
    async fn insert_pending(
        &self,
        execution: &RoundExecution,
    ) -> Result<InsertPendingOutcome, ExecutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let device = encode_device(execution)?;

        let new_row = NewRoundExecutionRow {
            id: execution.id(),
            template_id: execution.template_id(),
            schedule_id: execution.schedule_id(),
            installation_id: execution.installation_id(),
            scheduled_at: execution.scheduled_at(),
            guard_id: execution.guard_id(),
            status: execution.status().as_str(),
            checkpoints_total: execution.checkpoints_total() as i32,
            checkpoints_completed: execution.checkpoints_completed() as i32,
            trust_score: i16::from(execution.trust_score()),
            started_at: execution.started_at(),
            completed_at: execution.completed_at(),
            device: device.as_ref(),
        };

        let inserted = diesel::insert_into(round_executions::table)
            .values(&new_row)
            .on_conflict((
                round_executions::schedule_id,
                round_executions::scheduled_at,
            ))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(diesel_error)?;

        Ok(if inserted == 0 {
            InsertPendingOutcome::AlreadyScheduled
        } else {
            InsertPendingOutcome::Created
        })
    }

    async fn find_by_id(
        &self,
        execution_id: &Uuid,
    ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = round_executions::table
            .filter(round_executions::id.eq(execution_id))
            .select(RoundExecutionRow::as_select())
            .first::<RoundExecutionRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(row_to_execution)
            .transpose()
            .map_err(conversion_error)
    }

    async fn record_start(
        &self,
        execution_id: &Uuid,
        start: &ExecutionStart,
    ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let device = start
            .device
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|err| ExecutionRepositoryError::query(format!("encode device: {err}")))?;

        let changeset = ExecutionStartChangeset {
            guard_id: start.guard_id,
            status: ExecutionStatus::InProgress.as_str(),
            started_at: start.started_at,
            device: device.as_ref(),
        };

        let row = diesel::update(
            round_executions::table
                .filter(round_executions::id.eq(execution_id))
                .filter(round_executions::status.eq_any(ACTIVE_STATUSES)),
        )
        .set(&changeset)
        .returning(RoundExecutionRow::as_returning())
        .get_result::<RoundExecutionRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        row.map(row_to_execution)
            .transpose()
            .map_err(conversion_error)
    }

    async fn finalize(
        &self,
        execution_id: &Uuid,
        completion: &ExecutionCompletion,
    ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let changeset = ExecutionCompletionChangeset {
            status: completion.status.as_str(),
            checkpoints_total: completion.checkpoints_total as i32,
            checkpoints_completed: completion.checkpoints_completed as i32,
            trust_score: i16::from(completion.trust_score),
            completed_at: completion.completed_at,
        };

        let row = diesel::update(
            round_executions::table
                .filter(round_executions::id.eq(execution_id))
                .filter(round_executions::status.eq_any(ACTIVE_STATUSES)),
        )
        .set(&changeset)
        .returning(RoundExecutionRow::as_returning())
        .get_result::<RoundExecutionRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        row.map(row_to_execution)
            .transpose()
            .map_err(conversion_error)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and status guards.

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let mapped = pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(
            mapped,
            ExecutionRepositoryError::Connection { .. }
        ));
        assert!(mapped.to_string().contains("connection refused"));
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let mapped = diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(mapped, ExecutionRepositoryError::Query { .. }));
        assert!(mapped.to_string().contains("record not found"));
    }

    #[rstest]
    fn active_status_guard_covers_exactly_the_non_terminal_states() {
        for label in ACTIVE_STATUSES {
            let status: ExecutionStatus = label.parse().expect("known status label");
            assert!(status.is_active(), "{label} should accept activity");
        }
        for status in [ExecutionStatus::Completed, ExecutionStatus::NotPerformed] {
            assert!(!ACTIVE_STATUSES.contains(&status.as_str()));
        }
    }
}
