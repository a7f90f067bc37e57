//! Alert domain service.
//!
//! Implements the operator-facing alert ports: listing raised alerts and
//! resolving them with compare-and-set semantics.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::Error;
use crate::domain::ports::{
    AlertCommand, AlertFilter, AlertPayload, AlertQuery, AlertRepository, AlertRepositoryError,
    ListAlertsRequest, ListAlertsResponse, ResolveAlertOutcome, ResolveAlertRequest,
};

fn map_repository_error(error: AlertRepositoryError) -> Error {
    match error {
        AlertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("alert repository unavailable: {message}"))
        }
        AlertRepositoryError::Query { message } => {
            Error::internal(format!("alert repository error: {message}"))
        }
    }
}

/// Alert service implementing command and query driving ports.
#[derive(Clone)]
pub struct AlertService<R> {
    alerts: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> AlertService<R> {
    /// Create an alert service over the alert repository.
    pub fn new(alerts: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { alerts, clock }
    }
}

#[async_trait]
impl<R> AlertCommand for AlertService<R>
where
    R: AlertRepository,
{
    async fn resolve_alert(&self, request: ResolveAlertRequest) -> Result<AlertPayload, Error> {
        let outcome = self
            .alerts
            .resolve(&request.alert_id, &request.resolver_id, self.clock.utc())
            .await
            .map_err(map_repository_error)?;

        match outcome {
            ResolveAlertOutcome::Resolved(alert) => {
                info!(
                    alert_id = %alert.id(),
                    resolver_id = %request.resolver_id,
                    "alert resolved"
                );
                Ok(alert.into())
            }
            ResolveAlertOutcome::AlreadyResolved => Err(Error::conflict(format!(
                "alert {} is already resolved",
                request.alert_id
            ))),
            ResolveAlertOutcome::NotFound => Err(Error::not_found(format!(
                "alert {} was not found",
                request.alert_id
            ))),
        }
    }
}

#[async_trait]
impl<R> AlertQuery for AlertService<R>
where
    R: AlertRepository,
{
    async fn list_alerts(&self, request: ListAlertsRequest) -> Result<ListAlertsResponse, Error> {
        let alerts = self
            .alerts
            .list(&AlertFilter {
                installation_id: request.installation_id,
                unresolved_only: request.unresolved_only,
            })
            .await
            .map_err(map_repository_error)?;

        Ok(ListAlertsResponse {
            alerts: alerts.into_iter().map(Into::into).collect(),
        })
    }
}

#[cfg(test)]
#[path = "alert_service_tests.rs"]
mod tests;
