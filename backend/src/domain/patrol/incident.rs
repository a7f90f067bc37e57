//! Incident entity: free-form events reported during an execution.

use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::geo::GeoPoint;

use super::PatrolValidationError;

/// Reserved incident kind raised by the panic operation.
pub const PANIC_INCIDENT_KIND: &str = "panic";

/// Non-blank incident category.
///
/// Kinds are free-form except for [`PANIC_INCIDENT_KIND`], which only the
/// panic operation may create.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentKind(String);

impl IncidentKind {
    /// Wrap a kind label, rejecting blank values.
    pub fn new(value: impl Into<String>) -> Result<Self, PatrolValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(PatrolValidationError::BlankIncidentKind);
        }
        Ok(Self(value))
    }

    /// The reserved panic kind.
    #[must_use]
    pub fn panic() -> Self {
        Self(PANIC_INCIDENT_KIND.to_owned())
    }

    /// Whether this is the reserved panic kind.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        self.0 == PANIC_INCIDENT_KIND
    }

    /// The kind label.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IncidentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Input payload for [`Incident::new`].
#[derive(Debug, Clone)]
pub struct IncidentDraft {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Option<Uuid>,
    pub kind: IncidentKind,
    pub description: String,
    pub photo_url: Option<String>,
    pub position: Option<GeoPoint>,
    pub reported_at: DateTime<Utc>,
}

/// A reported event tied to an execution, append-only once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Incident {
    pub(super) id: Uuid,
    pub(super) execution_id: Uuid,
    pub(super) checkpoint_id: Option<Uuid>,
    pub(super) kind: IncidentKind,
    pub(super) description: String,
    pub(super) photo_url: Option<String>,
    pub(super) position: Option<GeoPoint>,
    pub(super) reported_at: DateTime<Utc>,
}

impl Incident {
    /// Creates a validated incident.
    pub fn new(draft: IncidentDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the incident id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the execution the incident occurred in.
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Returns the checkpoint involved, if any.
    pub fn checkpoint_id(&self) -> Option<Uuid> {
        self.checkpoint_id
    }

    /// Returns the incident category.
    pub fn kind(&self) -> &IncidentKind {
        &self.kind
    }

    /// Returns the reporter's description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the attached photo URL, if any.
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    /// Returns the position reported with the incident.
    pub fn position(&self) -> Option<&GeoPoint> {
        self.position.as_ref()
    }

    /// Returns when the incident was reported.
    pub fn reported_at(&self) -> DateTime<Utc> {
        self.reported_at
    }
}
