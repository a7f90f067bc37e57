//! PostgreSQL-backed `IncidentRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::Incident;
use crate::domain::ports::{IncidentRepository, IncidentRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewIncidentRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::position_to_columns;
use super::schema::incidents;

/// Diesel-backed implementation of the incident repository port.
#[derive(Clone)]
pub struct DieselIncidentRepository {
    pool: DbPool,
}

impl DieselIncidentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> IncidentRepositoryError {
    map_pool_error(error, IncidentRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> IncidentRepositoryError {
    map_diesel_error(
        error,
        IncidentRepositoryError::query,
        IncidentRepositoryError::connection,
    )
}

#[async_trait]
impl IncidentRepository for DieselIncidentRepository {
    async fn insert(&self, incident: &Incident) -> Result<(), IncidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;
        let (lat, lng) = position_to_columns(incident.position());

        let new_row = NewIncidentRow {
            id: incident.id(),
            execution_id: incident.execution_id(),
            checkpoint_id: incident.checkpoint_id(),
            kind: incident.kind().as_str(),
            description: incident.description(),
            photo_url: incident.photo_url(),
            lat,
            lng,
            reported_at: incident.reported_at(),
        };

        diesel::insert_into(incidents::table)
            .values(&new_row)
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(diesel_error)
    }
}
