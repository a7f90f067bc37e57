//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the migrations under `backend/migrations/`
//! exactly. They are used by Diesel for compile-time query validation and
//! type-safe SQL generation.

diesel::table! {
    /// Reusable patrol round definitions per installation.
    round_templates (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Installation the template belongs to.
        installation_id -> Uuid,
        /// Human-readable template name.
        name -> Varchar,
        /// Checkpoint ordering policy: `strict` or `flexible`.
        ordering -> Varchar,
        /// Checkpoints of the round in visit order.
        checkpoint_ids -> Array<Uuid>,
        /// Whether the template can drive new executions.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Scannable waypoints with optional geofences.
    ///
    /// `(installation_id, scan_code)` is unique so one code resolves to at
    /// most one checkpoint per installation.
    checkpoints (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Installation the checkpoint belongs to.
        installation_id -> Uuid,
        /// Stable code carried by the physical tag.
        scan_code -> Varchar,
        /// Registered latitude, when the checkpoint has been surveyed.
        lat -> Nullable<Float8>,
        /// Registered longitude, when the checkpoint has been surveyed.
        lng -> Nullable<Float8>,
        /// Geofence acceptance radius in meters.
        radius_m -> Float8,
        /// Whether the checkpoint is currently scannable.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recurrence rules that expand into execution slots.
    round_schedules (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Template the schedule instantiates.
        template_id -> Uuid,
        /// Weekday numbers the schedule runs on, `0` (Sunday) to `6`.
        weekdays -> Array<Int2>,
        /// Daily window start time.
        start_time -> Time,
        /// Daily window end time; at or before `start_time` means overnight.
        end_time -> Time,
        /// Minutes between slots inside the window.
        frequency_minutes -> Int4,
        /// Grace period for starting a slot, in minutes.
        tolerance_minutes -> Int4,
        /// Whether the schedule participates in generation passes.
        active -> Bool,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Concrete patrol rounds spawned from schedule slots.
    ///
    /// `(schedule_id, scheduled_at)` is unique; generation passes lean on
    /// that constraint for idempotency.
    round_executions (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Template the execution follows.
        template_id -> Uuid,
        /// Schedule that produced the slot.
        schedule_id -> Uuid,
        /// Installation the round patrols, denormalised for filtering.
        installation_id -> Uuid,
        /// Slot instant the round was generated for.
        scheduled_at -> Timestamptz,
        /// Guard who started the round, once assigned.
        guard_id -> Nullable<Uuid>,
        /// Lifecycle status label.
        status -> Varchar,
        /// Checkpoint count of the template at completion time.
        checkpoints_total -> Int4,
        /// Distinct template checkpoints that were marked.
        checkpoints_completed -> Int4,
        /// Aggregated round trust score, 0 to 100.
        trust_score -> Int2,
        /// First-start timestamp; restarts keep the original value.
        started_at -> Nullable<Timestamptz>,
        /// Closing timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Device metadata reported at start, as JSON.
        device -> Nullable<Jsonb>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only trail of checkpoint scans.
    checkpoint_marks (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Execution the mark belongs to.
        execution_id -> Uuid,
        /// Checkpoint that was scanned.
        checkpoint_id -> Uuid,
        /// Scan timestamp reported by the service clock.
        marked_at -> Timestamptz,
        /// Reported latitude, when the device had a fix.
        lat -> Nullable<Float8>,
        /// Reported longitude, when the device had a fix.
        lng -> Nullable<Float8>,
        /// Distance to the registered checkpoint position in meters.
        distance_m -> Nullable<Float8>,
        /// Whether the scan passed the geofence check.
        geo_valid -> Bool,
        /// Speed from the previous mark in km/h, when derivable.
        speed_from_prev_kmh -> Nullable<Float8>,
        /// Normalised accelerometer activity, 0.0 to 1.0.
        movement_score -> Nullable<Float8>,
        /// Battery percentage at scan time.
        battery_pct -> Nullable<Int2>,
        /// Opaque device fingerprint for continuity checks.
        device_fingerprint -> Nullable<Varchar>,
        /// Photo evidence URL.
        photo_url -> Nullable<Varchar>,
        /// Anomaly code labels detected on this scan.
        anomalies -> Array<Text>,
        /// Checkpoint trust score, 0 to 100.
        trust_score -> Int2,
        /// Insertion sequence; tie-break for equal `marked_at` values.
        seq -> Int8,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Free-form events reported during executions.
    incidents (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Execution the incident occurred in.
        execution_id -> Uuid,
        /// Checkpoint involved, when the report names one.
        checkpoint_id -> Nullable<Uuid>,
        /// Incident category; `panic` is reserved for the panic button.
        kind -> Varchar,
        /// Reporter's description.
        description -> Text,
        /// Photo evidence URL.
        photo_url -> Nullable<Varchar>,
        /// Reported latitude.
        lat -> Nullable<Float8>,
        /// Reported longitude.
        lng -> Nullable<Float8>,
        /// Report timestamp.
        reported_at -> Timestamptz,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Operator-facing alerts raised by anomalies and the panic button.
    alerts (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Installation the alert concerns.
        installation_id -> Uuid,
        /// Execution the alert was raised from, when tied to one.
        execution_id -> Nullable<Uuid>,
        /// Alert kind label: `anomaly` or `panic`.
        kind -> Varchar,
        /// Severity label: `info`, `warning`, or `critical`.
        severity -> Varchar,
        /// Human-readable alert message.
        message -> Text,
        /// Structured context, such as the anomaly codes behind the alert.
        payload -> Nullable<Jsonb>,
        /// Whether an operator has resolved the alert.
        resolved -> Bool,
        /// Operator who resolved the alert.
        resolved_by -> Nullable<Uuid>,
        /// Resolution timestamp.
        resolved_at -> Nullable<Timestamptz>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(round_schedules -> round_templates (template_id));
diesel::joinable!(round_executions -> round_templates (template_id));
diesel::joinable!(round_executions -> round_schedules (schedule_id));
diesel::joinable!(checkpoint_marks -> round_executions (execution_id));
diesel::joinable!(checkpoint_marks -> checkpoints (checkpoint_id));
diesel::joinable!(incidents -> round_executions (execution_id));

diesel::allow_tables_to_appear_in_same_query!(
    round_templates,
    checkpoints,
    round_schedules,
    round_executions,
    checkpoint_marks,
    incidents,
    alerts,
);
