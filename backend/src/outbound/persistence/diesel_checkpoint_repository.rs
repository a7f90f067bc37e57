//! PostgreSQL-backed `CheckpointRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Checkpoint;
use crate::domain::ports::{CheckpointRepository, CheckpointRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::CheckpointRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::row_to_checkpoint;
use super::schema::checkpoints;

/// Diesel-backed implementation of the checkpoint repository port.
#[derive(Clone)]
pub struct DieselCheckpointRepository {
    pool: DbPool,
}

impl DieselCheckpointRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> CheckpointRepositoryError {
    map_pool_error(error, CheckpointRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> CheckpointRepositoryError {
    map_diesel_error(
        error,
        CheckpointRepositoryError::query,
        CheckpointRepositoryError::connection,
    )
}

fn convert_row(row: CheckpointRow) -> Result<Checkpoint, CheckpointRepositoryError> {
    row_to_checkpoint(row).map_err(|err| CheckpointRepositoryError::query(err.to_string()))
}

#[async_trait]
impl CheckpointRepository for DieselCheckpointRepository {
    async fn find_by_id(
        &self,
        checkpoint_id: &Uuid,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = checkpoints::table
            .filter(checkpoints::id.eq(checkpoint_id))
            .select(CheckpointRow::as_select())
            .first::<CheckpointRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(convert_row).transpose()
    }

    async fn find_by_scan_code(
        &self,
        installation_id: &Uuid,
        scan_code: &str,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        // Deactivated tags must stop resolving immediately.
        let row = checkpoints::table
            .filter(checkpoints::installation_id.eq(installation_id))
            .filter(checkpoints::scan_code.eq(scan_code))
            .filter(checkpoints::active.eq(true))
            .select(CheckpointRow::as_select())
            .first::<CheckpointRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(convert_row).transpose()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping and row conversion plumbing.

    use chrono::Utc;
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let mapped = pool_error(PoolError::checkout("pool exhausted"));

        assert!(matches!(mapped, CheckpointRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn half_stored_position_surfaces_as_query_error() {
        let row = CheckpointRow {
            id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            scan_code: "NFC-0042".into(),
            lat: None,
            lng: Some(-0.1278),
            radius_m: 50.0,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let error = convert_row(row).expect_err("half position should fail");
        assert!(matches!(error, CheckpointRepositoryError::Query { .. }));
    }
}
