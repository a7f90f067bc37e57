//! Driving port for alert mutations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::trust::AlertSeverity;
use crate::domain::{Alert, AlertKind, Error};

/// Serializable alert projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub execution_id: Option<Uuid>,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub payload: Option<Value>,
    pub resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
}

impl From<Alert> for AlertPayload {
    fn from(value: Alert) -> Self {
        Self {
            id: value.id(),
            installation_id: value.installation_id(),
            execution_id: value.execution_id(),
            kind: value.kind(),
            severity: value.severity(),
            message: value.message().to_owned(),
            payload: value.payload().cloned(),
            resolved: value.is_resolved(),
            resolved_by: value.resolved_by(),
            resolved_at: value.resolved_at(),
        }
    }
}

/// Request to resolve an open alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAlertRequest {
    pub alert_id: Uuid,
    pub resolver_id: Uuid,
}

/// Driving port for alert write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertCommand: Send + Sync {
    /// Resolves an alert on behalf of the given operator.
    ///
    /// Returns the updated alert. Resolving an already-resolved alert is a
    /// conflict; callers surface `Result::Err(Error)` at the boundary layer.
    async fn resolve_alert(&self, request: ResolveAlertRequest) -> Result<AlertPayload, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAlertCommand;

#[async_trait]
impl AlertCommand for FixtureAlertCommand {
    async fn resolve_alert(&self, request: ResolveAlertRequest) -> Result<AlertPayload, Error> {
        Err(Error::not_found(format!(
            "alert {} was not found",
            request.alert_id
        )))
    }
}
