//! Driving port for patrol execution mutations.
//!
//! Covers the guard-facing lifecycle: starting a round, marking checkpoints,
//! closing the round, the panic button, and freeform incident reports.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::anomaly::{AnomalyCode, MOVEMENT_FLOOR, ScanSignals, detect_anomalies};
use crate::domain::trust::{AlertSeverity, TrustBand, TrustSignals, checkpoint_trust_score, trust_band};
use crate::domain::{
    Alert, AlertDraft, AlertKind, CheckpointMark, CheckpointMarkDraft, DeviceInfo, Error,
    ExecutionStatus, GeoPoint, Incident, IncidentDraft, IncidentKind, RoundExecution,
    RoundExecutionDraft,
};

use super::alert_command::AlertPayload;

/// Serializable round execution projection for driving ports.
///
/// Carries the derived `completion_pct` and `trust_band` so clients never
/// recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionPayload {
    pub id: Uuid,
    pub template_id: Uuid,
    pub schedule_id: Uuid,
    pub installation_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub guard_id: Option<Uuid>,
    pub status: ExecutionStatus,
    pub checkpoints_total: u32,
    pub checkpoints_completed: u32,
    pub completion_pct: u8,
    pub trust_score: u8,
    pub trust_band: TrustBand,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub device: Option<DeviceInfo>,
}

impl From<RoundExecution> for ExecutionPayload {
    fn from(value: RoundExecution) -> Self {
        Self {
            id: value.id(),
            template_id: value.template_id(),
            schedule_id: value.schedule_id(),
            installation_id: value.installation_id(),
            scheduled_at: value.scheduled_at(),
            guard_id: value.guard_id(),
            status: value.status(),
            checkpoints_total: value.checkpoints_total(),
            checkpoints_completed: value.checkpoints_completed(),
            completion_pct: value.completion_pct(),
            trust_score: value.trust_score(),
            trust_band: trust_band(value.trust_score()),
            started_at: value.started_at(),
            completed_at: value.completed_at(),
            device: value.device().cloned(),
        }
    }
}

/// Serializable checkpoint mark projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkPayload {
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

impl From<CheckpointMark> for MarkPayload {
    fn from(value: CheckpointMark) -> Self {
        Self {
            id: value.id(),
            execution_id: value.execution_id(),
            checkpoint_id: value.checkpoint_id(),
            marked_at: value.marked_at(),
            position: value.position().copied(),
            distance_m: value.distance_m(),
            geo_valid: value.geo_valid(),
            speed_from_prev_kmh: value.speed_from_prev_kmh(),
            movement_score: value.movement_score(),
            battery_pct: value.battery_pct(),
            device_fingerprint: value.device_fingerprint().map(str::to_owned),
            photo_url: value.photo_url().map(str::to_owned),
            anomalies: value.anomalies().clone(),
            trust_score: value.trust_score(),
        }
    }
}

/// Serializable incident projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPayload {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Option<Uuid>,
    pub kind: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub position: Option<GeoPoint>,
    pub reported_at: DateTime<Utc>,
}

impl From<Incident> for IncidentPayload {
    fn from(value: Incident) -> Self {
        Self {
            id: value.id(),
            execution_id: value.execution_id(),
            checkpoint_id: value.checkpoint_id(),
            kind: value.kind().as_str().to_owned(),
            description: value.description().to_owned(),
            photo_url: value.photo_url().map(str::to_owned),
            position: value.position().copied(),
            reported_at: value.reported_at(),
        }
    }
}

/// Incident and alert pair raised by the panic button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanicPayload {
    pub incident: IncidentPayload,
    pub alert: AlertPayload,
}

/// Request to start an execution on behalf of a guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartExecutionRequest {
    pub execution_id: Uuid,
    pub guard_id: Uuid,
    pub device: Option<DeviceInfo>,
}

/// Request to mark a checkpoint within an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkCheckpointRequest {
    pub execution_id: Uuid,
    pub scan_code: String,
    pub position: Option<GeoPoint>,
    pub battery_pct: Option<i16>,
    pub movement_score: Option<f64>,
    pub photo_url: Option<String>,
    pub device_fingerprint: Option<String>,
}

/// Request to close an execution and settle its final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteExecutionRequest {
    pub execution_id: Uuid,
}

/// Request raised by the panic button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPanicRequest {
    pub execution_id: Uuid,
    pub position: Option<GeoPoint>,
    pub note: Option<String>,
}

/// Request to report a freeform incident during an execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentRequest {
    pub execution_id: Uuid,
    pub checkpoint_id: Option<Uuid>,
    pub kind: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub position: Option<GeoPoint>,
}

/// Driving port for patrol execution write operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatrolCommand: Send + Sync {
    /// Moves a pending or interrupted execution to `in_progress` for a guard.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use uuid::Uuid;
    /// # use backend::domain::ports::{FixturePatrolCommand, PatrolCommand, StartExecutionRequest};
    /// # async fn example() -> Result<(), backend::domain::Error> {
    /// let execution_id = Uuid::new_v4();
    /// let command = FixturePatrolCommand;
    /// let started = command
    ///     .start_execution(StartExecutionRequest {
    ///         execution_id,
    ///         guard_id: Uuid::new_v4(),
    ///         device: None,
    ///     })
    ///     .await?;
    /// assert_eq!(started.id, execution_id);
    /// # Ok(())
    /// # }
    /// ```
    async fn start_execution(
        &self,
        request: StartExecutionRequest,
    ) -> Result<ExecutionPayload, Error>;

    /// Records a checkpoint scan, scoring it and raising an anomaly alert
    /// when the scan trips any detection rule.
    async fn mark_checkpoint(&self, request: MarkCheckpointRequest) -> Result<MarkPayload, Error>;

    /// Closes an execution, recomputing coverage and the round trust score.
    async fn complete_execution(
        &self,
        request: CompleteExecutionRequest,
    ) -> Result<ExecutionPayload, Error>;

    /// Records a panic incident and raises its critical alert.
    async fn trigger_panic(&self, request: TriggerPanicRequest) -> Result<PanicPayload, Error>;

    /// Records a freeform incident against an execution.
    async fn report_incident(
        &self,
        request: ReportIncidentRequest,
    ) -> Result<IncidentPayload, Error>;
}

/// Fixture command implementation for tests that do not need persistence.
///
/// Responses are fabricated from the request alone; scoring and validation
/// still run through the domain functions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixturePatrolCommand;

#[async_trait]
impl PatrolCommand for FixturePatrolCommand {
    async fn start_execution(
        &self,
        request: StartExecutionRequest,
    ) -> Result<ExecutionPayload, Error> {
        let now = Utc::now();
        let execution = RoundExecution::new(RoundExecutionDraft {
            id: request.execution_id,
            template_id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            scheduled_at: now,
            guard_id: Some(request.guard_id),
            status: ExecutionStatus::InProgress,
            checkpoints_total: 0,
            checkpoints_completed: 0,
            trust_score: 0,
            started_at: Some(now),
            completed_at: None,
            device: request.device,
        })
        .map_err(|err| Error::invalid_request(format!("invalid execution state: {err}")))?;

        Ok(execution.into())
    }

    async fn mark_checkpoint(&self, request: MarkCheckpointRequest) -> Result<MarkPayload, Error> {
        let signals = ScanSignals {
            geo_valid: false,
            same_position_as_prev: false,
            speed_from_prev_kmh: None,
            movement_score: request.movement_score,
            battery_pct: request.battery_pct,
            prev_battery_pct: None,
        };
        let anomalies = detect_anomalies(&signals);
        let trust_score = checkpoint_trust_score(&TrustSignals {
            geo_valid: false,
            has_movement: request
                .movement_score
                .is_some_and(|score| score >= MOVEMENT_FLOOR),
            has_photo: request.photo_url.is_some(),
            same_device_as_prev: false,
            speed_from_prev_kmh: None,
            battery_pct: request.battery_pct,
        });

        let mark = CheckpointMark::new(CheckpointMarkDraft {
            id: Uuid::new_v4(),
            execution_id: request.execution_id,
            checkpoint_id: Uuid::new_v4(),
            marked_at: Utc::now(),
            position: request.position,
            distance_m: None,
            geo_valid: false,
            speed_from_prev_kmh: None,
            movement_score: request.movement_score,
            battery_pct: request.battery_pct,
            device_fingerprint: request.device_fingerprint,
            photo_url: request.photo_url,
            anomalies,
            trust_score,
        })
        .map_err(|err| Error::invalid_request(format!("invalid checkpoint mark: {err}")))?;

        Ok(mark.into())
    }

    async fn complete_execution(
        &self,
        request: CompleteExecutionRequest,
    ) -> Result<ExecutionPayload, Error> {
        let now = Utc::now();
        let execution = RoundExecution::new(RoundExecutionDraft {
            id: request.execution_id,
            template_id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            scheduled_at: now,
            guard_id: None,
            status: ExecutionStatus::Completed,
            checkpoints_total: 0,
            checkpoints_completed: 0,
            trust_score: 0,
            started_at: Some(now),
            completed_at: Some(now),
            device: None,
        })
        .map_err(|err| Error::invalid_request(format!("invalid execution state: {err}")))?;

        Ok(execution.into())
    }

    async fn trigger_panic(&self, request: TriggerPanicRequest) -> Result<PanicPayload, Error> {
        let now = Utc::now();
        let incident = Incident::new(IncidentDraft {
            id: Uuid::new_v4(),
            execution_id: request.execution_id,
            checkpoint_id: None,
            kind: IncidentKind::panic(),
            description: request
                .note
                .unwrap_or_else(|| "panic button pressed".to_owned()),
            photo_url: None,
            position: request.position,
            reported_at: now,
        })
        .map_err(|err| Error::invalid_request(format!("invalid incident: {err}")))?;
        let alert = Alert::new(AlertDraft {
            id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            execution_id: Some(request.execution_id),
            kind: AlertKind::Panic,
            severity: AlertSeverity::Critical,
            message: format!("panic triggered on execution {}", request.execution_id),
            payload: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        })
        .map_err(|err| Error::invalid_request(format!("invalid alert: {err}")))?;

        Ok(PanicPayload {
            incident: incident.into(),
            alert: alert.into(),
        })
    }

    async fn report_incident(
        &self,
        request: ReportIncidentRequest,
    ) -> Result<IncidentPayload, Error> {
        let kind = IncidentKind::new(request.kind)
            .map_err(|err| Error::invalid_request(format!("invalid incident kind: {err}")))?;
        if kind.is_panic() {
            return Err(Error::invalid_request(
                "incident kind 'panic' is reserved for the panic button",
            ));
        }

        let incident = Incident::new(IncidentDraft {
            id: Uuid::new_v4(),
            execution_id: request.execution_id,
            checkpoint_id: request.checkpoint_id,
            kind,
            description: request.description,
            photo_url: request.photo_url,
            position: request.position,
            reported_at: Utc::now(),
        })
        .map_err(|err| Error::invalid_request(format!("invalid incident: {err}")))?;

        Ok(incident.into())
    }
}
