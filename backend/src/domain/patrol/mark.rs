//! Checkpoint mark entity: one immutable scan event.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::anomaly::AnomalyCode;
use crate::domain::geo::GeoPoint;

use super::PatrolValidationError;

/// Input payload for [`CheckpointMark::new`].
#[derive(Debug, Clone)]
pub struct CheckpointMarkDraft {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Uuid,
    pub marked_at: DateTime<Utc>,
    pub position: Option<GeoPoint>,
    pub distance_m: Option<f64>,
    pub geo_valid: bool,
    pub speed_from_prev_kmh: Option<f64>,
    pub movement_score: Option<f64>,
    pub battery_pct: Option<i16>,
    pub device_fingerprint: Option<String>,
    pub photo_url: Option<String>,
    pub anomalies: BTreeSet<AnomalyCode>,
    pub trust_score: u8,
}

/// One scan of a checkpoint inside an execution, append-only once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckpointMark {
    pub(super) id: Uuid,
    pub(super) execution_id: Uuid,
    pub(super) checkpoint_id: Uuid,
    pub(super) marked_at: DateTime<Utc>,
    pub(super) position: Option<GeoPoint>,
    pub(super) distance_m: Option<f64>,
    pub(super) geo_valid: bool,
    pub(super) speed_from_prev_kmh: Option<f64>,
    pub(super) movement_score: Option<f64>,
    pub(super) battery_pct: Option<i16>,
    pub(super) device_fingerprint: Option<String>,
    pub(super) photo_url: Option<String>,
    pub(super) anomalies: BTreeSet<AnomalyCode>,
    pub(super) trust_score: u8,
}

impl CheckpointMark {
    /// Creates a validated checkpoint mark.
    pub fn new(draft: CheckpointMarkDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the mark id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the execution this scan belongs to.
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Returns the scanned checkpoint.
    pub fn checkpoint_id(&self) -> Uuid {
        self.checkpoint_id
    }

    /// Returns when the scan was recorded.
    pub fn marked_at(&self) -> DateTime<Utc> {
        self.marked_at
    }

    /// Returns the reported position, when the device had a fix.
    pub fn position(&self) -> Option<&GeoPoint> {
        self.position.as_ref()
    }

    /// Returns the measured distance to the checkpoint in meters.
    pub fn distance_m(&self) -> Option<f64> {
        self.distance_m
    }

    /// Returns whether the scan passed the geofence check.
    pub fn geo_valid(&self) -> bool {
        self.geo_valid
    }

    /// Returns the speed from the previous mark in km/h.
    pub fn speed_from_prev_kmh(&self) -> Option<f64> {
        self.speed_from_prev_kmh
    }

    /// Returns the motion-sensor aggregate for the scan.
    pub fn movement_score(&self) -> Option<f64> {
        self.movement_score
    }

    /// Returns the reported battery percentage.
    pub fn battery_pct(&self) -> Option<i16> {
        self.battery_pct
    }

    /// Returns the scanning device's fingerprint.
    pub fn device_fingerprint(&self) -> Option<&str> {
        self.device_fingerprint.as_deref()
    }

    /// Returns the attached photo evidence URL.
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    /// Returns the anomaly codes raised by this scan.
    pub fn anomalies(&self) -> &BTreeSet<AnomalyCode> {
        &self.anomalies
    }

    /// Returns the per-scan trust score.
    pub fn trust_score(&self) -> u8 {
        self.trust_score
    }
}
