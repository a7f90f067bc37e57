//! Driving port for alert read operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

use super::alert_command::AlertPayload;

/// Request to list alerts for operators.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsRequest {
    /// Restrict to one installation when set.
    pub installation_id: Option<Uuid>,
    /// Drop resolved alerts from the listing.
    #[serde(default)]
    pub unresolved_only: bool,
}

/// Response listing alerts, unresolved first, newest first within each group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsResponse {
    pub alerts: Vec<AlertPayload>,
}

/// Driving port for alert read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertQuery: Send + Sync {
    /// Lists alerts matching the request filter.
    async fn list_alerts(&self, request: ListAlertsRequest) -> Result<ListAlertsResponse, Error>;
}

/// Fixture query implementation reporting no alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAlertQuery;

#[async_trait]
impl AlertQuery for FixtureAlertQuery {
    async fn list_alerts(&self, _request: ListAlertsRequest) -> Result<ListAlertsResponse, Error> {
        Ok(ListAlertsResponse { alerts: Vec::new() })
    }
}
