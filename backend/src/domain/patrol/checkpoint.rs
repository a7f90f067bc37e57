//! Checkpoint entity: a scannable waypoint with an optional geofence.

use uuid::Uuid;

use crate::domain::geo::GeoPoint;

use super::PatrolValidationError;

/// Input payload for [`Checkpoint::new`].
#[derive(Debug, Clone)]
pub struct CheckpointDraft {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub scan_code: String,
    pub position: Option<GeoPoint>,
    pub radius_m: f64,
    pub active: bool,
}

/// A scannable waypoint at an installation.
///
/// A checkpoint may lack a registered position; scans against it then fail
/// the geofence check rather than being trusted blindly.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    pub(super) id: Uuid,
    pub(super) installation_id: Uuid,
    pub(super) scan_code: String,
    pub(super) position: Option<GeoPoint>,
    pub(super) radius_m: f64,
    pub(super) active: bool,
}

impl Checkpoint {
    /// Creates a validated checkpoint.
    pub fn new(draft: CheckpointDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the checkpoint id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning installation id.
    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    /// Returns the stable code guards scan.
    pub fn scan_code(&self) -> &str {
        &self.scan_code
    }

    /// Returns the registered position, when surveyed.
    pub fn position(&self) -> Option<&GeoPoint> {
        self.position.as_ref()
    }

    /// Returns the acceptance radius in meters.
    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }

    /// Returns whether the checkpoint is currently scannable.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
