//! Live monitoring domain service.
//!
//! Projects the in-progress executions read model for polling dashboards.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::ports::{
    ListActiveExecutionsRequest, ListActiveExecutionsResponse, MonitoringQuery,
    MonitoringRepository, MonitoringRepositoryError,
};

fn map_repository_error(error: MonitoringRepositoryError) -> Error {
    match error {
        MonitoringRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("monitoring repository unavailable: {message}"))
        }
        MonitoringRepositoryError::Query { message } => {
            Error::internal(format!("monitoring repository error: {message}"))
        }
    }
}

/// Monitoring service implementing the query driving port.
#[derive(Clone)]
pub struct MonitoringService<R> {
    monitoring: Arc<R>,
}

impl<R> MonitoringService<R> {
    /// Create a monitoring service over the monitoring repository.
    pub fn new(monitoring: Arc<R>) -> Self {
        Self { monitoring }
    }
}

#[async_trait]
impl<R> MonitoringQuery for MonitoringService<R>
where
    R: MonitoringRepository,
{
    async fn list_active_executions(
        &self,
        request: ListActiveExecutionsRequest,
    ) -> Result<ListActiveExecutionsResponse, Error> {
        let patrols = self
            .monitoring
            .list_active(request.installation_id)
            .await
            .map_err(map_repository_error)?;

        Ok(ListActiveExecutionsResponse {
            patrols: patrols.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "monitoring_service_tests.rs"]
mod tests;
