//! PostgreSQL-backed `MarkRepository` implementation using Diesel ORM.
//!
//! Marks are append-only. Reads order by `marked_at` with the `seq` column
//! as insertion-order tie-break, so two marks in the same millisecond still
//! sort deterministically.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::CheckpointMark;
use crate::domain::ports::{MarkRepository, MarkRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{CheckpointMarkRow, NewCheckpointMarkRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::{anomalies_to_columns, position_to_columns, row_to_mark};
use super::schema::checkpoint_marks;

/// Diesel-backed implementation of the checkpoint mark repository port.
#[derive(Clone)]
pub struct DieselMarkRepository {
    pool: DbPool,
}

impl DieselMarkRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> MarkRepositoryError {
    map_pool_error(error, MarkRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> MarkRepositoryError {
    map_diesel_error(
        error,
        MarkRepositoryError::query,
        MarkRepositoryError::connection,
    )
}

fn convert_row(row: CheckpointMarkRow) -> Result<CheckpointMark, MarkRepositoryError> {
    row_to_mark(row).map_err(|err| MarkRepositoryError::query(err.to_string()))
}

#[async_trait]
impl MarkRepository for DieselMarkRepository {
    async fn append(&self, mark: &CheckpointMark) -> Result<(), MarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (lat, lng) = position_to_columns(mark.position());

        let new_row = NewCheckpointMarkRow {
            id: mark.id(),
            execution_id: mark.execution_id(),
            checkpoint_id: mark.checkpoint_id(),
            marked_at: mark.marked_at(),
            lat,
            lng,
            distance_m: mark.distance_m(),
            geo_valid: mark.geo_valid(),
            speed_from_prev_kmh: mark.speed_from_prev_kmh(),
            movement_score: mark.movement_score(),
            battery_pct: mark.battery_pct(),
            device_fingerprint: mark.device_fingerprint(),
            photo_url: mark.photo_url(),
            anomalies: anomalies_to_columns(mark.anomalies()),
            trust_score: i16::from(mark.trust_score()),
        };

        diesel::insert_into(checkpoint_marks::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn latest_for_execution(
        &self,
        execution_id: &Uuid,
    ) -> Result<Option<CheckpointMark>, MarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = checkpoint_marks::table
            .filter(checkpoint_marks::execution_id.eq(execution_id))
            .order((
                checkpoint_marks::marked_at.desc(),
                checkpoint_marks::seq.desc(),
            ))
            .select(CheckpointMarkRow::as_select())
            .first::<CheckpointMarkRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(convert_row).transpose()
    }

    async fn list_for_execution(
        &self,
        execution_id: &Uuid,
    ) -> Result<Vec<CheckpointMark>, MarkRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<CheckpointMarkRow> = checkpoint_marks::table
            .filter(checkpoint_marks::execution_id.eq(execution_id))
            .order((
                checkpoint_marks::marked_at.asc(),
                checkpoint_marks::seq.asc(),
            ))
            .select(CheckpointMarkRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(convert_row).collect()
    }
}
