//! Alert entity: operator-facing notifications with resolution tracking.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::trust::AlertSeverity;

use super::PatrolValidationError;

/// Source category of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Raised automatically from scan anomalies.
    Anomaly,
    /// Raised by a guard's panic signal.
    Panic,
}

impl AlertKind {
    /// Stable wire and storage label for the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anomaly => "anomaly",
            Self::Panic => "panic",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown alert kind label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAlertKindError {
    value: String,
}

impl fmt::Display for ParseAlertKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown alert kind: {}", self.value)
    }
}

impl std::error::Error for ParseAlertKindError {}

impl FromStr for AlertKind {
    type Err = ParseAlertKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "anomaly" => Ok(Self::Anomaly),
            "panic" => Ok(Self::Panic),
            other => Err(ParseAlertKindError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Input payload for [`Alert::new`].
#[derive(Debug, Clone)]
pub struct AlertDraft {
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

/// An operator-facing notification scoped to an installation.
///
/// Resolution is a one-way transition; a resolved alert carries both the
/// resolver and the resolution timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub(super) id: Uuid,
    pub(super) installation_id: Uuid,
    pub(super) execution_id: Option<Uuid>,
    pub(super) kind: AlertKind,
    pub(super) severity: AlertSeverity,
    pub(super) message: String,
    pub(super) payload: Option<Value>,
    pub(super) resolved: bool,
    pub(super) resolved_by: Option<Uuid>,
    pub(super) resolved_at: Option<DateTime<Utc>>,
}

impl Alert {
    /// Creates a validated alert.
    pub fn new(draft: AlertDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the alert id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the installation the alert belongs to.
    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    /// Returns the execution that triggered the alert, if any.
    pub fn execution_id(&self) -> Option<Uuid> {
        self.execution_id
    }

    /// Returns the source category.
    pub fn kind(&self) -> AlertKind {
        self.kind
    }

    /// Returns the operator-facing severity.
    pub fn severity(&self) -> AlertSeverity {
        self.severity
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the structured context payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Returns whether an operator has resolved the alert.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Returns the resolving operator, once resolved.
    pub fn resolved_by(&self) -> Option<Uuid> {
        self.resolved_by
    }

    /// Returns the resolution timestamp, once resolved.
    pub fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Returns a resolved copy of this alert.
    #[must_use]
    pub fn resolve(mut self, resolved_by: Uuid, resolved_at: DateTime<Utc>) -> Self {
        self.resolved = true;
        self.resolved_by = Some(resolved_by);
        self.resolved_at = Some(resolved_at);
        self
    }
}
