//! PostgreSQL-backed `RoundTemplateRepository` implementation using Diesel
//! ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::RoundTemplate;
use crate::domain::ports::{RoundTemplateRepository, TemplateRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::RoundTemplateRow;
use super::pool::{DbPool, PoolError};
use super::row_conversions::row_to_template;
use super::schema::round_templates;

/// Diesel-backed implementation of the round template repository port.
#[derive(Clone)]
pub struct DieselRoundTemplateRepository {
    pool: DbPool,
}

impl DieselRoundTemplateRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn pool_error(error: PoolError) -> TemplateRepositoryError {
    map_pool_error(error, TemplateRepositoryError::connection)
}

fn diesel_error(error: diesel::result::Error) -> TemplateRepositoryError {
    map_diesel_error(
        error,
        TemplateRepositoryError::query,
        TemplateRepositoryError::connection,
    )
}

#[async_trait]
impl RoundTemplateRepository for DieselRoundTemplateRepository {
    async fn find_by_id(
        &self,
        template_id: &Uuid,
    ) -> Result<Option<RoundTemplate>, TemplateRepositoryError> {
        let mut conn = self.pool.get().await.map_err(pool_error)?;

        let row = round_templates::table
            .filter(round_templates::id.eq(template_id))
            .select(RoundTemplateRow::as_select())
            .first::<RoundTemplateRow>(&mut conn)
            .await
            .optional()
            .map_err(diesel_error)?;

        row.map(|row| {
            row_to_template(row).map_err(|err| TemplateRepositoryError::query(err.to_string()))
        })
        .transpose()
    }
}
