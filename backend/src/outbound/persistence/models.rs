//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, NaiveTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{
    alerts, checkpoint_marks, checkpoints, incidents, round_executions, round_schedules,
    round_templates,
};

/// Row struct for reading from the round_templates table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = round_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoundTemplateRow {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub name: String,
    pub ordering: String,
    pub checkpoint_ids: Vec<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Selectable wrapper for reading just a template's display name in joins.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = round_templates)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TemplateNameRow {
    pub name: String,
}

// ---------------------------------------------------------------------------
// Checkpoint models
// ---------------------------------------------------------------------------

/// Row struct for reading from the checkpoints table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = checkpoints)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CheckpointRow {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub scan_code: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub radius_m: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Round schedule models
// ---------------------------------------------------------------------------

/// Row struct for reading from the round_schedules table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = round_schedules)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoundScheduleRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub weekdays: Vec<i16>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub frequency_minutes: i32,
    pub tolerance_minutes: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Round execution models
// ---------------------------------------------------------------------------

/// Row struct for reading from the round_executions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = round_executions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RoundExecutionRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub schedule_id: Uuid,
    pub installation_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub guard_id: Option<Uuid>,
    pub status: String,
    pub checkpoints_total: i32,
    pub checkpoints_completed: i32,
    pub trust_score: i16,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub device: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating pending execution records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = round_executions)]
pub(crate) struct NewRoundExecutionRow<'a> {
    pub id: Uuid,
    pub template_id: Uuid,
    pub schedule_id: Uuid,
    pub installation_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub guard_id: Option<Uuid>,
    pub status: &'a str,
    pub checkpoints_total: i32,
    pub checkpoints_completed: i32,
    pub trust_score: i16,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub device: Option<&'a serde_json::Value>,
}

/// Changeset applied when a guard starts an execution.
///
/// `device` is skipped when `None`, which matters: a restart without fresh
/// device metadata must not erase what the first start recorded.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = round_executions)]
pub(crate) struct ExecutionStartChangeset<'a> {
    pub guard_id: Uuid,
    pub status: &'a str,
    pub started_at: DateTime<Utc>,
    pub device: Option<&'a serde_json::Value>,
}

/// Changeset applied when an execution is closed.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = round_executions)]
pub(crate) struct ExecutionCompletionChangeset<'a> {
    pub status: &'a str,
    pub checkpoints_total: i32,
    pub checkpoints_completed: i32,
    pub trust_score: i16,
    pub completed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Checkpoint mark models
// ---------------------------------------------------------------------------

/// Row struct for reading from the checkpoint_marks table.
///
/// The `seq` tie-break column stays out of the struct; ordering references
/// it directly in queries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = checkpoint_marks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct CheckpointMarkRow {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Uuid,
    pub marked_at: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub distance_m: Option<f64>,
    pub geo_valid: bool,
    pub speed_from_prev_kmh: Option<f64>,
    pub movement_score: Option<f64>,
    pub battery_pct: Option<i16>,
    pub device_fingerprint: Option<String>,
    pub photo_url: Option<String>,
    pub anomalies: Vec<String>,
    pub trust_score: i16,
}

/// Insertable struct for appending checkpoint marks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = checkpoint_marks)]
pub(crate) struct NewCheckpointMarkRow<'a> {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Uuid,
    pub marked_at: DateTime<Utc>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub distance_m: Option<f64>,
    pub geo_valid: bool,
    pub speed_from_prev_kmh: Option<f64>,
    pub movement_score: Option<f64>,
    pub battery_pct: Option<i16>,
    pub device_fingerprint: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub anomalies: Vec<String>,
    pub trust_score: i16,
}

// ---------------------------------------------------------------------------
// Incident models
// ---------------------------------------------------------------------------

/// Insertable struct for recording incidents. Incidents are append-only, so
/// no read struct exists.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = incidents)]
pub(crate) struct NewIncidentRow<'a> {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub checkpoint_id: Option<Uuid>,
    pub kind: &'a str,
    pub description: &'a str,
    pub photo_url: Option<&'a str>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub reported_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Alert models
// ---------------------------------------------------------------------------

/// Row struct for reading from the alerts table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = alerts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AlertRow {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub execution_id: Option<Uuid>,
    pub kind: String,
    pub severity: String,
    pub message: String,
    pub payload: Option<serde_json::Value>,
    pub resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Insertable struct for raising alerts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = alerts)]
pub(crate) struct NewAlertRow<'a> {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub execution_id: Option<Uuid>,
    pub kind: &'a str,
    pub severity: &'a str,
    pub message: &'a str,
    pub payload: Option<&'a serde_json::Value>,
    pub resolved: bool,
    pub resolved_by: Option<Uuid>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Changeset applied when an operator resolves an alert.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = alerts)]
pub(crate) struct AlertResolveChangeset {
    pub resolved: bool,
    pub resolved_by: Uuid,
    pub resolved_at: DateTime<Utc>,
}
