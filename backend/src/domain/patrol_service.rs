//! Patrol execution domain service.
//!
//! Implements the guard-facing command port: starting rounds, marking
//! checkpoints with anomaly detection and trust scoring, settling final
//! round status, the panic button, and freeform incident reports.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::anomaly::{MOVEMENT_FLOOR, ScanSignals, detect_anomalies};
use crate::domain::geo::{RadiusCheck, check_radius, distance_meters, speed_kmh};
use crate::domain::ports::{
    AlertRepository, AlertRepositoryError, CheckpointRepository, CheckpointRepositoryError,
    CompleteExecutionRequest, ExecutionCompletion, ExecutionPayload, ExecutionRepository,
    ExecutionRepositoryError, ExecutionStart, IncidentPayload, IncidentRepository,
    IncidentRepositoryError, MarkCheckpointRequest, MarkPayload, MarkRepository,
    MarkRepositoryError, PanicPayload, PatrolCommand, ReportIncidentRequest,
    RoundTemplateRepository, StartExecutionRequest, TemplateRepositoryError, TriggerPanicRequest,
};
use crate::domain::trust::{TrustSignals, alert_severity, checkpoint_trust_score, round_trust_score};
use crate::domain::{
    Alert, AlertDraft, AlertKind, Checkpoint, CheckpointMark, CheckpointMarkDraft, ExecutionStatus,
    Incident, IncidentDraft, IncidentKind, RoundExecution,
};

fn map_execution_error(error: ExecutionRepositoryError) -> Error {
    match error {
        ExecutionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round execution repository unavailable: {message}"))
        }
        ExecutionRepositoryError::Query { message } => {
            Error::internal(format!("round execution repository error: {message}"))
        }
    }
}

fn map_checkpoint_error(error: CheckpointRepositoryError) -> Error {
    match error {
        CheckpointRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("checkpoint repository unavailable: {message}"))
        }
        CheckpointRepositoryError::Query { message } => {
            Error::internal(format!("checkpoint repository error: {message}"))
        }
    }
}

fn map_template_error(error: TemplateRepositoryError) -> Error {
    match error {
        TemplateRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round template repository unavailable: {message}"))
        }
        TemplateRepositoryError::Query { message } => {
            Error::internal(format!("round template repository error: {message}"))
        }
    }
}

fn map_mark_error(error: MarkRepositoryError) -> Error {
    match error {
        MarkRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("checkpoint mark repository unavailable: {message}"))
        }
        MarkRepositoryError::Query { message } => {
            Error::internal(format!("checkpoint mark repository error: {message}"))
        }
    }
}

fn map_incident_error(error: IncidentRepositoryError) -> Error {
    match error {
        IncidentRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("incident repository unavailable: {message}"))
        }
        IncidentRepositoryError::Query { message } => {
            Error::internal(format!("incident repository error: {message}"))
        }
    }
}

fn map_alert_error(error: AlertRepositoryError) -> Error {
    match error {
        AlertRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("alert repository unavailable: {message}"))
        }
        AlertRepositoryError::Query { message } => {
            Error::internal(format!("alert repository error: {message}"))
        }
    }
}

/// Collaborators required by [`PatrolService`].
pub struct PatrolServiceDeps {
    pub executions: Arc<dyn ExecutionRepository>,
    pub checkpoints: Arc<dyn CheckpointRepository>,
    pub templates: Arc<dyn RoundTemplateRepository>,
    pub marks: Arc<dyn MarkRepository>,
    pub incidents: Arc<dyn IncidentRepository>,
    pub alerts: Arc<dyn AlertRepository>,
    pub clock: Arc<dyn Clock>,
}

/// Patrol service implementing the execution command port.
#[derive(Clone)]
pub struct PatrolService {
    executions: Arc<dyn ExecutionRepository>,
    checkpoints: Arc<dyn CheckpointRepository>,
    templates: Arc<dyn RoundTemplateRepository>,
    marks: Arc<dyn MarkRepository>,
    incidents: Arc<dyn IncidentRepository>,
    alerts: Arc<dyn AlertRepository>,
    clock: Arc<dyn Clock>,
}

impl PatrolService {
    /// Create a patrol service over the given collaborators.
    pub fn new(deps: PatrolServiceDeps) -> Self {
        Self {
            executions: deps.executions,
            checkpoints: deps.checkpoints,
            templates: deps.templates,
            marks: deps.marks,
            incidents: deps.incidents,
            alerts: deps.alerts,
            clock: deps.clock,
        }
    }

    async fn load_execution(&self, execution_id: &Uuid) -> Result<RoundExecution, Error> {
        self.executions
            .find_by_id(execution_id)
            .await
            .map_err(map_execution_error)?
            .ok_or_else(|| Error::not_found(format!("round execution {execution_id} was not found")))
    }

    async fn resolve_checkpoint(
        &self,
        execution: &RoundExecution,
        scan_code: &str,
    ) -> Result<Checkpoint, Error> {
        self.checkpoints
            .find_by_scan_code(&execution.installation_id(), scan_code)
            .await
            .map_err(map_checkpoint_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "no active checkpoint with scan code {scan_code} at installation {}",
                    execution.installation_id()
                ))
            })
    }

    async fn raise_anomaly_alert(
        &self,
        execution: &RoundExecution,
        checkpoint: &Checkpoint,
        mark: &CheckpointMark,
    ) -> Result<(), Error> {
        let codes = mark
            .anomalies()
            .iter()
            .map(|code| code.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let alert = Alert::new(AlertDraft {
            id: Uuid::new_v4(),
            installation_id: execution.installation_id(),
            execution_id: Some(execution.id()),
            kind: AlertKind::Anomaly,
            severity: alert_severity(mark.anomalies()),
            message: format!(
                "checkpoint {} marked with anomalies: {codes}",
                checkpoint.scan_code()
            ),
            payload: Some(serde_json::json!({
                "checkpointId": checkpoint.id(),
                "markId": mark.id(),
                "anomalies": mark.anomalies(),
            })),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        })
        .map_err(|err| Error::internal(format!("invalid anomaly alert state: {err}")))?;

        self.alerts
            .insert(&alert)
            .await
            .map_err(map_alert_error)?;

        warn!(
            execution_id = %execution.id(),
            checkpoint_id = %checkpoint.id(),
            mark_id = %mark.id(),
            severity = %alert.severity(),
            anomalies = %codes,
            "anomaly alert raised"
        );
        Ok(())
    }
}

#[async_trait]
impl PatrolCommand for PatrolService {
    async fn start_execution(
        &self,
        request: StartExecutionRequest,
    ) -> Result<ExecutionPayload, Error> {
        let execution = self.load_execution(&request.execution_id).await?;
        if execution.status().is_terminal() {
            return Err(Error::invalid_state(format!(
                "round execution {} is already {}",
                execution.id(),
                execution.status()
            )));
        }

        // Restarting an interrupted round keeps the original start time and
        // falls back to previously reported device info.
        let start = ExecutionStart {
            guard_id: request.guard_id,
            started_at: execution.started_at().unwrap_or_else(|| self.clock.utc()),
            device: request.device.or_else(|| execution.device().cloned()),
        };
        let updated = self
            .executions
            .record_start(&execution.id(), &start)
            .await
            .map_err(map_execution_error)?
            .ok_or_else(|| {
                Error::invalid_state(format!(
                    "round execution {} can no longer be started",
                    execution.id()
                ))
            })?;

        info!(
            execution_id = %updated.id(),
            guard_id = %request.guard_id,
            "round execution started"
        );
        Ok(updated.into())
    }

    async fn mark_checkpoint(&self, request: MarkCheckpointRequest) -> Result<MarkPayload, Error> {
        let execution = self.load_execution(&request.execution_id).await?;
        if !execution.status().is_active() {
            return Err(Error::invalid_state(format!(
                "round execution {} is already {}",
                execution.id(),
                execution.status()
            )));
        }

        let checkpoint = self.resolve_checkpoint(&execution, &request.scan_code).await?;
        let previous = self
            .marks
            .latest_for_execution(&execution.id())
            .await
            .map_err(map_mark_error)?;
        let marked_at = self.clock.utc();

        let radius = request.position.as_ref().map_or(
            RadiusCheck {
                valid: false,
                distance_m: None,
            },
            |position| check_radius(position, checkpoint.position(), checkpoint.radius_m()),
        );
        let speed_from_prev_kmh = previous.as_ref().and_then(|prev| {
            let from = prev.position()?;
            let to = request.position.as_ref()?;
            let distance = distance_meters(from, Some(to))?;
            let elapsed_secs =
                (marked_at - prev.marked_at()).num_milliseconds() as f64 / 1000.0;
            Some(speed_kmh(distance, elapsed_secs))
        });
        let same_position_as_prev = matches!(
            (
                previous.as_ref().and_then(CheckpointMark::position),
                request.position.as_ref()
            ),
            (Some(from), Some(to)) if from == to
        );
        let same_device_as_prev = matches!(
            (
                previous.as_ref().and_then(CheckpointMark::device_fingerprint),
                request.device_fingerprint.as_deref()
            ),
            (Some(from), Some(to)) if from == to
        );

        let anomalies = detect_anomalies(&ScanSignals {
            geo_valid: radius.valid,
            same_position_as_prev,
            speed_from_prev_kmh,
            movement_score: request.movement_score,
            battery_pct: request.battery_pct,
            prev_battery_pct: previous.as_ref().and_then(CheckpointMark::battery_pct),
        });
        let trust_score = checkpoint_trust_score(&TrustSignals {
            geo_valid: radius.valid,
            has_movement: request
                .movement_score
                .is_some_and(|score| score >= MOVEMENT_FLOOR),
            has_photo: request.photo_url.is_some(),
            same_device_as_prev,
            speed_from_prev_kmh,
            battery_pct: request.battery_pct,
        });

        let mark = CheckpointMark::new(CheckpointMarkDraft {
            id: Uuid::new_v4(),
            execution_id: execution.id(),
            checkpoint_id: checkpoint.id(),
            marked_at,
            position: request.position,
            distance_m: radius.distance_m,
            geo_valid: radius.valid,
            speed_from_prev_kmh,
            movement_score: request.movement_score,
            battery_pct: request.battery_pct,
            device_fingerprint: request.device_fingerprint,
            photo_url: request.photo_url,
            anomalies,
            trust_score,
        })
        .map_err(|err| Error::invalid_request(format!("invalid checkpoint mark: {err}")))?;

        self.marks.append(&mark).await.map_err(map_mark_error)?;

        if !mark.anomalies().is_empty() {
            self.raise_anomaly_alert(&execution, &checkpoint, &mark)
                .await?;
        }

        Ok(mark.into())
    }

    async fn complete_execution(
        &self,
        request: CompleteExecutionRequest,
    ) -> Result<ExecutionPayload, Error> {
        let execution = self.load_execution(&request.execution_id).await?;
        if execution.status().is_terminal() {
            return Err(Error::invalid_state(format!(
                "round execution {} is already {}",
                execution.id(),
                execution.status()
            )));
        }

        let template = self
            .templates
            .find_by_id(&execution.template_id())
            .await
            .map_err(map_template_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "round template {} was not found",
                    execution.template_id()
                ))
            })?;
        let marks = self
            .marks
            .list_for_execution(&execution.id())
            .await
            .map_err(map_mark_error)?;

        // Coverage counts distinct checkpoints restricted to the template's
        // own set; same-installation scans outside the round do not count.
        let template_set: HashSet<Uuid> = template.checkpoint_ids().iter().copied().collect();
        let completed = marks
            .iter()
            .map(CheckpointMark::checkpoint_id)
            .filter(|id| template_set.contains(id))
            .collect::<HashSet<_>>()
            .len();
        let total = template.checkpoint_count();
        let scores = marks
            .iter()
            .map(CheckpointMark::trust_score)
            .collect::<Vec<_>>();

        let status = if completed >= total {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Incomplete
        };
        let completion = ExecutionCompletion {
            status,
            checkpoints_total: total as u32,
            checkpoints_completed: completed as u32,
            trust_score: round_trust_score(&scores),
            completed_at: self.clock.utc(),
        };

        let finalized = self
            .executions
            .finalize(&execution.id(), &completion)
            .await
            .map_err(map_execution_error)?;
        match finalized {
            Some(updated) => {
                info!(
                    execution_id = %updated.id(),
                    status = %updated.status(),
                    completion_pct = updated.completion_pct(),
                    trust_score = updated.trust_score(),
                    "round execution settled"
                );
                Ok(updated.into())
            }
            // A concurrent completion won the compare-and-set; surface the
            // stored terminal row instead of failing the retry.
            None => {
                let stored = self.load_execution(&execution.id()).await?;
                Ok(stored.into())
            }
        }
    }

    async fn trigger_panic(&self, request: TriggerPanicRequest) -> Result<PanicPayload, Error> {
        let execution = self.load_execution(&request.execution_id).await?;
        let guard_id = execution.guard_id().ok_or_else(|| {
            Error::invalid_state(format!(
                "round execution {} has no assigned guard",
                execution.id()
            ))
        })?;

        let reported_at = self.clock.utc();
        let incident = Incident::new(IncidentDraft {
            id: Uuid::new_v4(),
            execution_id: execution.id(),
            checkpoint_id: None,
            kind: IncidentKind::panic(),
            description: request
                .note
                .unwrap_or_else(|| "panic button pressed".to_owned()),
            photo_url: None,
            position: request.position,
            reported_at,
        })
        .map_err(|err| Error::internal(format!("invalid panic incident state: {err}")))?;
        let alert = Alert::new(AlertDraft {
            id: Uuid::new_v4(),
            installation_id: execution.installation_id(),
            execution_id: Some(execution.id()),
            kind: AlertKind::Panic,
            severity: crate::domain::trust::AlertSeverity::Critical,
            message: format!("panic triggered by guard {guard_id} on execution {}", execution.id()),
            payload: Some(serde_json::json!({
                "incidentId": incident.id(),
                "guardId": guard_id,
                "position": request.position,
            })),
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        })
        .map_err(|err| Error::internal(format!("invalid panic alert state: {err}")))?;

        // A duress signal must never fail silently: both writes propagate
        // their errors to the caller.
        self.incidents
            .insert(&incident)
            .await
            .map_err(map_incident_error)?;
        self.alerts.insert(&alert).await.map_err(map_alert_error)?;

        error!(
            execution_id = %execution.id(),
            guard_id = %guard_id,
            incident_id = %incident.id(),
            alert_id = %alert.id(),
            "panic triggered"
        );
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

        let execution = self.load_execution(&request.execution_id).await?;
        if let Some(checkpoint_id) = request.checkpoint_id {
            self.checkpoints
                .find_by_id(&checkpoint_id)
                .await
                .map_err(map_checkpoint_error)?
                .ok_or_else(|| {
                    Error::not_found(format!("checkpoint {checkpoint_id} was not found"))
                })?;
        }

        let incident = Incident::new(IncidentDraft {
            id: Uuid::new_v4(),
            execution_id: execution.id(),
            checkpoint_id: request.checkpoint_id,
            kind,
            description: request.description,
            photo_url: request.photo_url,
            position: request.position,
            reported_at: self.clock.utc(),
        })
        .map_err(|err| Error::invalid_request(format!("invalid incident: {err}")))?;

        self.incidents
            .insert(&incident)
            .await
            .map_err(map_incident_error)?;

        info!(
            execution_id = %execution.id(),
            incident_id = %incident.id(),
            kind = %incident.kind(),
            "incident reported"
        );
        Ok(incident.into())
    }
}

#[cfg(test)]
#[path = "patrol_service_tests.rs"]
mod tests;
