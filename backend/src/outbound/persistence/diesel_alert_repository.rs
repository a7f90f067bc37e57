//! PostgreSQL-backed `AlertRepository` implementation using Diesel ORM.
//!
//! Resolution is a compare-and-set: the update is guarded on
//! `resolved = false`, so concurrent resolvers race on the database row and
//! exactly one wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::Alert;
use crate::domain::ports::{
    AlertFilter, AlertRepository, AlertRepositoryError, ResolveAlertOutcome,
};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{AlertResolveChangeset, AlertRow, NewAlertRow};
use super::pool::{DbPool, PoolError};
use super::row_conversions::row_to_alert;
use super::schema::alerts;

/// Diesel-backed implementation of the alert repository port.
#[derive(Clone)]
pub struct DieselAlertRepository {
    pool: DbPool,
}

impl DieselAlertRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> AlertRepositoryError {
    map_pool_error(error, AlertRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> AlertRepositoryError {
    map_diesel_error(
        error,
        AlertRepositoryError::query,
        AlertRepositoryError::connection,
    )
}

fn convert_row(row: AlertRow) -> Result<Alert, AlertRepositoryError> {
    row_to_alert(row).map_err(|err| AlertRepositoryError::query(err.to_string()))
}

#[async_trait]
impl AlertRepository for DieselAlertRepository {
    async fn insert(&self, alert: &Alert) -> Result<(), AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let new_row = NewAlertRow {
            id: alert.id(),
            installation_id: alert.installation_id(),
            execution_id: alert.execution_id(),
            kind: alert.kind().as_str(),
            severity: alert.severity().as_str(),
            message: alert.message(),
            payload: alert.payload(),
            resolved: alert.is_resolved(),
            resolved_by: alert.resolved_by(),
            resolved_at: alert.resolved_at(),
        };

        diesel::insert_into(alerts::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }

    async fn find_by_id(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = alerts::table
            .filter(alerts::id.eq(alert_id))
            .select(AlertRow::as_select())
            .first::<AlertRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(convert_row).transpose()
    }

    async fn resolve(
        &self,
        alert_id: &Uuid,
        resolver_id: &Uuid,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolveAlertOutcome, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let changeset = AlertResolveChangeset {
            resolved: true,
            resolved_by: *resolver_id,
            resolved_at,
        };

        let updated = diesel::update(
            alerts::table
                .filter(alerts::id.eq(alert_id))
                .filter(alerts::resolved.eq(false)),
        )
        .set(&changeset)
        .returning(AlertRow::as_returning())
        .get_result::<AlertRow>(&mut conn)
        .await
        .optional()
        .map_err(diesel_error)?;

        if let Some(row) = updated {
            return convert_row(row).map(ResolveAlertOutcome::Resolved);
        }

        // The guard missed: the row is either already resolved or absent.
        let existing = alerts::table
            .filter(alerts::id.eq(alert_id))
            .count()
            .get_result::<i64>(&mut conn)
            .await
            .map_err(diesel_error)?;

        if existing > 0 {
            Ok(ResolveAlertOutcome::AlreadyResolved)
        } else {
            Ok(ResolveAlertOutcome::NotFound)
        }
    }

    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let mut query = alerts::table
            .select(AlertRow::as_select())
            .order((alerts::resolved.asc(), alerts::created_at.desc()))
            .into_boxed();

        if let Some(installation_id) = filter.installation_id {
            query = query.filter(alerts::installation_id.eq(installation_id));
        }
        if filter.unresolved_only {
            query = query.filter(alerts::resolved.eq(false));
        }

        let rows: Vec<AlertRow> = query.load(&mut conn).await.map_err(diesel_error)?;

        rows.into_iter().map(convert_row).collect()
    }
}
