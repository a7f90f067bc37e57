//! PostgreSQL-backed `RoundScheduleRepository` implementation using Diesel
//! ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::RoundSchedule;
use crate::domain::ports::{RoundScheduleRepository, ScheduleRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::RoundScheduleRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::row_to_schedule;
use super::schema::round_schedules;

/// Diesel-backed implementation of the round schedule repository port.
#[derive(Clone)]
pub struct DieselRoundScheduleRepository {
    pool: DbPool,
}

impl DieselRoundScheduleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> ScheduleRepositoryError {
    map_pool_error(error, ScheduleRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> ScheduleRepositoryError {
    map_diesel_error(
        error,
        ScheduleRepositoryError::query,
        ScheduleRepositoryError::connection,
    )
}

fn convert_row(row: RoundScheduleRow) -> Result<RoundSchedule, ScheduleRepositoryError> {
    row_to_schedule(row).map_err(|err| ScheduleRepositoryError::query(err.to_string()))
}

#[async_trait]
impl RoundScheduleRepository for DieselRoundScheduleRepository {
    async fn find_by_id(
        &self,
        schedule_id: &Uuid,
    ) -> Result<Option<RoundSchedule>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = round_schedules::table
            .filter(round_schedules::id.eq(schedule_id))
            .select(RoundScheduleRow::as_select())
            .first::<RoundScheduleRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(convert_row).transpose()
    }

    async fn list_active(&self) -> Result<Vec<RoundSchedule>, ScheduleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let rows: Vec<RoundScheduleRow> = round_schedules::table
            .filter(round_schedules::active.eq(true))
            .order(round_schedules::id.asc())
            .select(RoundScheduleRow::as_select())
            .load(&mut conn)
            .await
            .map_err(diesel_error)?;

        rows.into_iter().map(convert_row).collect()
    }
}
