//! Draft validation for patrol entities.

use std::collections::HashSet;

use uuid::Uuid;

use super::alert::{Alert, AlertDraft};
use super::checkpoint::{Checkpoint, CheckpointDraft};
use super::execution::{RoundExecution, RoundExecutionDraft};
use super::incident::{Incident, IncidentDraft};
use super::mark::{CheckpointMark, CheckpointMarkDraft};
use super::schedule::{RoundSchedule, RoundScheduleDraft};
use super::template::{RoundTemplate, RoundTemplateDraft};
use super::PatrolValidationError;

fn validate_unique_checkpoints(checkpoint_ids: &[Uuid]) -> Result<(), PatrolValidationError> {
    let mut seen = HashSet::with_capacity(checkpoint_ids.len());
    for checkpoint_id in checkpoint_ids {
        if !seen.insert(*checkpoint_id) {
            return Err(PatrolValidationError::DuplicateCheckpoint {
                checkpoint_id: *checkpoint_id,
            });
        }
    }
    Ok(())
}

fn validate_measurement(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), PatrolValidationError> {
    if let Some(value) = value {
        if !value.is_finite() || value < 0.0 {
            return Err(PatrolValidationError::InvalidMeasurement { field, value });
        }
    }
    Ok(())
}

impl TryFrom<RoundTemplateDraft> for RoundTemplate {
    type Error = PatrolValidationError;

    fn try_from(draft: RoundTemplateDraft) -> Result<Self, Self::Error> {
        let RoundTemplateDraft {
            id,
            installation_id,
            name,
            ordering,
            checkpoint_ids,
            active,
        } = draft;
        if name.trim().is_empty() {
            return Err(PatrolValidationError::BlankTemplateName);
        }
        validate_unique_checkpoints(&checkpoint_ids)?;
        Ok(Self {
            id,
            installation_id,
            name,
            ordering,
            checkpoint_ids,
            active,
        })
    }
}

impl TryFrom<CheckpointDraft> for Checkpoint {
    type Error = PatrolValidationError;

    fn try_from(draft: CheckpointDraft) -> Result<Self, Self::Error> {
        let CheckpointDraft {
            id,
            installation_id,
            scan_code,
            position,
            radius_m,
            active,
        } = draft;
        if scan_code.trim().is_empty() {
            return Err(PatrolValidationError::BlankScanCode);
        }
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(PatrolValidationError::InvalidRadius { value: radius_m });
        }
        Ok(Self {
            id,
            installation_id,
            scan_code,
            position,
            radius_m,
            active,
        })
    }
}

impl TryFrom<RoundScheduleDraft> for RoundSchedule {
    type Error = PatrolValidationError;

    fn try_from(draft: RoundScheduleDraft) -> Result<Self, Self::Error> {
        let RoundScheduleDraft {
            id,
            template_id,
            weekdays,
            start_time,
            end_time,
            frequency_minutes,
            tolerance_minutes,
            active,
        } = draft;
        if frequency_minutes == 0 {
            return Err(PatrolValidationError::ZeroFrequency);
        }
        Ok(Self {
            id,
            template_id,
            weekdays,
            start_time,
            end_time,
            frequency_minutes,
            tolerance_minutes,
            active,
        })
    }
}

impl TryFrom<RoundExecutionDraft> for RoundExecution {
    type Error = PatrolValidationError;

    fn try_from(draft: RoundExecutionDraft) -> Result<Self, Self::Error> {
        let RoundExecutionDraft {
            id,
            template_id,
            schedule_id,
            installation_id,
            scheduled_at,
            guard_id,
            status,
            checkpoints_total,
            checkpoints_completed,
            trust_score,
            started_at,
            completed_at,
            device,
        } = draft;
        if checkpoints_completed > checkpoints_total {
            return Err(PatrolValidationError::CompletedExceedsTotal {
                completed: checkpoints_completed,
                total: checkpoints_total,
            });
        }
        if let (Some(started), Some(completed)) = (started_at, completed_at) {
            if completed < started {
                return Err(PatrolValidationError::CompletedBeforeStarted);
            }
        }
        Ok(Self {
            id,
            template_id,
            schedule_id,
            installation_id,
            scheduled_at,
            guard_id,
            status,
            checkpoints_total,
            checkpoints_completed,
            trust_score,
            started_at,
            completed_at,
            device,
        })
    }
}

impl TryFrom<CheckpointMarkDraft> for CheckpointMark {
    type Error = PatrolValidationError;

    fn try_from(draft: CheckpointMarkDraft) -> Result<Self, Self::Error> {
        let CheckpointMarkDraft {
            id,
            execution_id,
            checkpoint_id,
            marked_at,
            position,
            distance_m,
            geo_valid,
            speed_from_prev_kmh,
            movement_score,
            battery_pct,
            device_fingerprint,
            photo_url,
            anomalies,
            trust_score,
        } = draft;
        validate_measurement("distance", distance_m)?;
        validate_measurement("speed", speed_from_prev_kmh)?;
        if let Some(score) = movement_score {
            if !(0.0..=1.0).contains(&score) {
                return Err(PatrolValidationError::MovementScoreOutOfRange { value: score });
            }
        }
        if let Some(battery) = battery_pct {
            if !(0..=100).contains(&battery) {
                return Err(PatrolValidationError::BatteryOutOfRange { value: battery });
            }
        }
        Ok(Self {
            id,
            execution_id,
            checkpoint_id,
            marked_at,
            position,
            distance_m,
            geo_valid,
            speed_from_prev_kmh,
            movement_score,
            battery_pct,
            device_fingerprint,
            photo_url,
            anomalies,
            trust_score,
        })
    }
}

impl TryFrom<IncidentDraft> for Incident {
    type Error = PatrolValidationError;

    fn try_from(draft: IncidentDraft) -> Result<Self, Self::Error> {
        let IncidentDraft {
            id,
            execution_id,
            checkpoint_id,
            kind,
            description,
            photo_url,
            position,
            reported_at,
        } = draft;
        Ok(Self {
            id,
            execution_id,
            checkpoint_id,
            kind,
            description,
            photo_url,
            position,
            reported_at,
        })
    }
}

impl TryFrom<AlertDraft> for Alert {
    type Error = PatrolValidationError;

    fn try_from(draft: AlertDraft) -> Result<Self, Self::Error> {
        let AlertDraft {
            id,
            installation_id,
            execution_id,
            kind,
            severity,
            message,
            payload,
            resolved,
            resolved_by,
            resolved_at,
        } = draft;
        if message.trim().is_empty() {
            return Err(PatrolValidationError::BlankAlertMessage);
        }
        let resolution_consistent = if resolved {
            resolved_by.is_some() && resolved_at.is_some()
        } else {
            resolved_by.is_none() && resolved_at.is_none()
        };
        if !resolution_consistent {
            return Err(PatrolValidationError::ResolutionStateMismatch);
        }
        Ok(Self {
            id,
            installation_id,
            execution_id,
            kind,
            severity,
            message,
            payload,
            resolved,
            resolved_by,
            resolved_at,
        })
    }
}
