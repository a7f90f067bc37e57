//! Row-to-domain conversions shared by the Diesel repository adapters.
//!
//! Stored rows re-enter the domain through the validated constructors, so a
//! corrupted row surfaces as a typed conversion error instead of smuggling
//! invalid state past the entities. Each adapter wraps the error into its
//! own port's query variant.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::anomaly::AnomalyCode;
use crate::domain::trust::AlertSeverity;
use crate::domain::{
    Alert, AlertDraft, AlertKind, Checkpoint, CheckpointDraft, CheckpointMark, CheckpointMarkDraft,
    CheckpointOrdering, DeviceInfo, ExecutionStatus, GeoPoint, RoundExecution,
    RoundExecutionDraft, RoundSchedule, RoundScheduleDraft, RoundTemplate, RoundTemplateDraft,
    WeekdaySet,
};

use super::models::{
    AlertRow, CheckpointMarkRow, CheckpointRow, RoundExecutionRow, RoundScheduleRow,
    RoundTemplateRow,
};

/// A stored row that could not be turned back into a domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct RowConversionError {
    message: String,
}

impl RowConversionError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for RowConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for RowConversionError {}

/// Rebuild an optional position from split coordinate columns.
///
/// A row holding only one coordinate is corrupt and rejected.
pub(super) fn position_from_columns(
    lat: Option<f64>,
    lng: Option<f64>,
) -> Result<Option<GeoPoint>, RowConversionError> {
    match (lat, lng) {
        (Some(lat), Some(lng)) => GeoPoint::new(lat, lng)
            .map(Some)
            .map_err(|err| RowConversionError::new(format!("decode position: {err}"))),
        (None, None) => Ok(None),
        _ => Err(RowConversionError::new(
            "decode position: lat and lng must be stored together",
        )),
    }
}

/// Split an optional position into its coordinate columns.
pub(super) fn position_to_columns(position: Option<&GeoPoint>) -> (Option<f64>, Option<f64>) {
    match position {
        Some(point) => (Some(point.lat()), Some(point.lng())),
        None => (None, None),
    }
}

pub(super) fn weekdays_to_columns(weekdays: WeekdaySet) -> Vec<i16> {
    weekdays.days().into_iter().map(i16::from).collect()
}

pub(super) fn weekdays_from_columns(days: Vec<i16>) -> Result<WeekdaySet, RowConversionError> {
    let days = days
        .into_iter()
        .map(|day| {
            u8::try_from(day)
                .map_err(|_| RowConversionError::new(format!("decode weekdays: {day} is negative")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    WeekdaySet::new(days).map_err(|err| RowConversionError::new(format!("decode weekdays: {err}")))
}

pub(super) fn anomalies_to_columns(anomalies: &BTreeSet<AnomalyCode>) -> Vec<String> {
    anomalies.iter().map(|code| code.as_str().to_owned()).collect()
}

pub(super) fn anomalies_from_columns(
    labels: Vec<String>,
) -> Result<BTreeSet<AnomalyCode>, RowConversionError> {
    labels
        .into_iter()
        .map(|label| {
            AnomalyCode::from_str(&label)
                .map_err(|err| RowConversionError::new(format!("decode anomalies: {err}")))
        })
        .collect()
}

pub(super) fn device_to_json(
    device: Option<&DeviceInfo>,
) -> Result<Option<serde_json::Value>, RowConversionError> {
    device
        .map(|info| {
            serde_json::to_value(info)
                .map_err(|err| RowConversionError::new(format!("encode device: {err}")))
        })
        .transpose()
}

pub(super) fn device_from_json(
    device: Option<serde_json::Value>,
) -> Result<Option<DeviceInfo>, RowConversionError> {
    device
        .map(|value| {
            serde_json::from_value(value)
                .map_err(|err| RowConversionError::new(format!("decode device: {err}")))
        })
        .transpose()
}

/// Convert a database row into a validated round template.
pub(super) fn row_to_template(row: RoundTemplateRow) -> Result<RoundTemplate, RowConversionError> {
    let RoundTemplateRow {
        id,
        installation_id,
        name,
        ordering,
        checkpoint_ids,
        active,
        created_at: _,
        updated_at: _,
    } = row;

    let ordering = CheckpointOrdering::from_str(&ordering)
        .map_err(|err| RowConversionError::new(format!("decode ordering: {err}")))?;

    RoundTemplate::new(RoundTemplateDraft {
        id,
        installation_id,
        name,
        ordering,
        checkpoint_ids,
        active,
    })
    .map_err(|err| RowConversionError::new(err.to_string()))
}

/// Convert a database row into a validated checkpoint.
pub(super) fn row_to_checkpoint(row: CheckpointRow) -> Result<Checkpoint, RowConversionError> {
    let CheckpointRow {
        id,
        installation_id,
        scan_code,
        lat,
        lng,
        radius_m,
        active,
        created_at: _,
        updated_at: _,
    } = row;

    let position = position_from_columns(lat, lng)?;

    Checkpoint::new(CheckpointDraft {
        id,
        installation_id,
        scan_code,
        position,
        radius_m,
        active,
    })
    .map_err(|err| RowConversionError::new(err.to_string()))
}

/// Convert a database row into a validated round schedule.
pub(super) fn row_to_schedule(row: RoundScheduleRow) -> Result<RoundSchedule, RowConversionError> {
    let RoundScheduleRow {
        id,
        template_id,
        weekdays,
        start_time,
        end_time,
        frequency_minutes,
        tolerance_minutes,
        active,
        created_at: _,
        updated_at: _,
    } = row;

    let weekdays = weekdays_from_columns(weekdays)?;
    let frequency_minutes = u32::try_from(frequency_minutes)
        .map_err(|_| RowConversionError::new("decode frequency_minutes: negative value"))?;
    let tolerance_minutes = u32::try_from(tolerance_minutes)
        .map_err(|_| RowConversionError::new("decode tolerance_minutes: negative value"))?;

    RoundSchedule::new(RoundScheduleDraft {
        id,
        template_id,
        weekdays,
        start_time,
        end_time,
        frequency_minutes,
        tolerance_minutes,
        active,
    })
    .map_err(|err| RowConversionError::new(err.to_string()))
}

/// Convert a database row into a validated round execution.
pub(super) fn row_to_execution(
    row: RoundExecutionRow,
) -> Result<RoundExecution, RowConversionError> {
    let RoundExecutionRow {
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
        created_at: _,
        updated_at: _,
    } = row;

    let status = ExecutionStatus::from_str(&status)
        .map_err(|err| RowConversionError::new(format!("decode status: {err}")))?;
    let checkpoints_total = u32::try_from(checkpoints_total)
        .map_err(|_| RowConversionError::new("decode checkpoints_total: negative value"))?;
    let checkpoints_completed = u32::try_from(checkpoints_completed)
        .map_err(|_| RowConversionError::new("decode checkpoints_completed: negative value"))?;
    let trust_score = u8::try_from(trust_score)
        .map_err(|_| RowConversionError::new("decode trust_score: out of range"))?;
    let device = device_from_json(device)?;

    RoundExecution::new(RoundExecutionDraft {
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
    .map_err(|err| RowConversionError::new(err.to_string()))
}

/// Convert a database row into a validated checkpoint mark.
pub(super) fn row_to_mark(row: CheckpointMarkRow) -> Result<CheckpointMark, RowConversionError> {
    let CheckpointMarkRow {
        id,
        execution_id,
        checkpoint_id,
        marked_at,
        lat,
        lng,
        distance_m,
        geo_valid,
        speed_from_prev_kmh,
        movement_score,
        battery_pct,
        device_fingerprint,
        photo_url,
        anomalies,
        trust_score,
    } = row;

    let position = position_from_columns(lat, lng)?;
    let anomalies = anomalies_from_columns(anomalies)?;
    let trust_score = u8::try_from(trust_score)
        .map_err(|_| RowConversionError::new("decode trust_score: out of range"))?;

    CheckpointMark::new(CheckpointMarkDraft {
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
    .map_err(|err| RowConversionError::new(err.to_string()))
}

/// Convert a database row into a validated alert.
pub(super) fn row_to_alert(row: AlertRow) -> Result<Alert, RowConversionError> {
    let AlertRow {
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
    } = row;

    let kind = AlertKind::from_str(&kind)
        .map_err(|err| RowConversionError::new(format!("decode kind: {err}")))?;
    let severity = AlertSeverity::from_str(&severity)
        .map_err(|err| RowConversionError::new(format!("decode severity: {err}")))?;

    Alert::new(AlertDraft {
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
    .map_err(|err| RowConversionError::new(err.to_string()))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for row conversion edge cases.

    use chrono::{NaiveTime, Utc};
    use rstest::{fixture, rstest};
    use uuid::Uuid;

    use super::*;

    #[fixture]
    fn execution_row() -> RoundExecutionRow {
        let now = Utc::now();
        RoundExecutionRow {
            id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            schedule_id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            scheduled_at: now,
            guard_id: None,
            status: "pending".into(),
            checkpoints_total: 0,
            checkpoints_completed: 0,
            trust_score: 0,
            started_at: None,
            completed_at: None,
            device: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[fixture]
    fn mark_row() -> CheckpointMarkRow {
        CheckpointMarkRow {
            id: Uuid::new_v4(),
            execution_id: Uuid::new_v4(),
            checkpoint_id: Uuid::new_v4(),
            marked_at: Utc::now(),
            lat: Some(51.5072),
            lng: Some(-0.1276),
            distance_m: Some(4.2),
            geo_valid: true,
            speed_from_prev_kmh: Some(3.1),
            movement_score: Some(0.4),
            battery_pct: Some(76),
            device_fingerprint: Some("fp-01".into()),
            photo_url: None,
            anomalies: vec![],
            trust_score: 100,
        }
    }

    #[rstest]
    fn weekdays_round_trip_through_columns() {
        let weekdays = WeekdaySet::new([1, 3, 5]).expect("valid weekdays");

        let columns = weekdays_to_columns(weekdays);
        assert_eq!(columns, vec![1, 3, 5]);

        let restored = weekdays_from_columns(columns).expect("columns decode");
        assert_eq!(restored, weekdays);
    }

    #[rstest]
    #[case::negative(vec![-1])]
    #[case::above_range(vec![7])]
    fn weekday_decode_rejects_out_of_range(#[case] days: Vec<i16>) {
        let error = weekdays_from_columns(days).expect_err("out of range weekday");
        assert!(error.to_string().contains("decode weekdays"));
    }

    #[rstest]
    fn anomaly_labels_round_trip_through_columns() {
        let anomalies: BTreeSet<AnomalyCode> =
            [AnomalyCode::GeoOutOfRange, AnomalyCode::LowBattery]
                .into_iter()
                .collect();

        let columns = anomalies_to_columns(&anomalies);
        let restored = anomalies_from_columns(columns).expect("labels decode");

        assert_eq!(restored, anomalies);
    }

    #[rstest]
    fn anomaly_decode_rejects_unknown_labels() {
        let error = anomalies_from_columns(vec!["ghost_in_the_machine".into()])
            .expect_err("unknown label");
        assert!(error.to_string().contains("decode anomalies"));
    }

    #[rstest]
    fn half_stored_position_is_rejected() {
        let error = position_from_columns(Some(51.5), None).expect_err("half position");
        assert!(error.to_string().contains("stored together"));
    }

    #[rstest]
    fn execution_decode_rejects_unknown_status(mut execution_row: RoundExecutionRow) {
        execution_row.status = "paused".into();

        let error = row_to_execution(execution_row).expect_err("unknown status");
        assert!(error.to_string().contains("decode status"));
    }

    #[rstest]
    fn execution_decode_rejects_oversized_trust_score(mut execution_row: RoundExecutionRow) {
        execution_row.trust_score = 400;

        let error = row_to_execution(execution_row).expect_err("trust score above u8");
        assert!(error.to_string().contains("trust_score"));
    }

    #[rstest]
    fn execution_device_round_trips_as_json(mut execution_row: RoundExecutionRow) {
        let device = DeviceInfo {
            fingerprint: Some("fp-01".into()),
            model: Some("Pixel 9".into()),
            os_version: None,
            app_version: None,
            battery_pct: Some(88),
        };
        execution_row.device = device_to_json(Some(&device)).expect("device encodes");

        let execution = row_to_execution(execution_row).expect("row decodes");
        assert_eq!(execution.device(), Some(&device));
    }

    #[rstest]
    fn mark_row_decodes_with_position_and_signals(mark_row: CheckpointMarkRow) {
        let mark = row_to_mark(mark_row).expect("row decodes");

        assert!(mark.geo_valid());
        assert_eq!(mark.battery_pct(), Some(76));
        let position = mark.position().expect("position present");
        assert!((position.lat() - 51.5072).abs() < f64::EPSILON);
    }

    #[rstest]
    fn schedule_row_decodes_times_and_weekdays() {
        let now = Utc::now();
        let row = RoundScheduleRow {
            id: Uuid::new_v4(),
            template_id: Uuid::new_v4(),
            weekdays: vec![0, 6],
            start_time: NaiveTime::from_hms_opt(22, 0, 0).expect("valid time"),
            end_time: NaiveTime::from_hms_opt(6, 0, 0).expect("valid time"),
            frequency_minutes: 120,
            tolerance_minutes: 15,
            active: true,
            created_at: now,
            updated_at: now,
        };

        let schedule = row_to_schedule(row).expect("row decodes");

        assert_eq!(schedule.frequency_minutes(), 120);
        assert!(schedule.weekdays().contains(chrono::Weekday::Sun));
        assert!(!schedule.weekdays().contains(chrono::Weekday::Mon));
    }

    #[rstest]
    fn alert_row_rejects_unknown_severity() {
        let row = AlertRow {
            id: Uuid::new_v4(),
            installation_id: Uuid::new_v4(),
            execution_id: None,
            kind: "anomaly".into(),
            severity: "catastrophic".into(),
            message: "checkpoint out of range".into(),
            payload: None,
            resolved: false,
            resolved_by: None,
            resolved_at: None,
        };

        let error = row_to_alert(row).expect_err("unknown severity");
        assert!(error.to_string().contains("decode severity"));
    }
}
