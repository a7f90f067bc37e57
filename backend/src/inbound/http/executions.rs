//! Patrol execution HTTP handlers.
//!
//! ```text
//! POST /api/v1/executions/{execution_id}/start
//! POST /api/v1/executions/{execution_id}/marks
//! POST /api/v1/executions/{execution_id}/complete
//! POST /api/v1/executions/{execution_id}/panic
//! POST /api/v1/executions/{execution_id}/incidents
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    CompleteExecutionRequest, ExecutionPayload, IncidentPayload, MarkCheckpointRequest,
    MarkPayload, PanicPayload, ReportIncidentRequest, StartExecutionRequest, TriggerPanicRequest,
};
use crate::domain::{DeviceInfo, Error, GeoPoint};
use crate::inbound::http::ApiResult;
use crate::inbound::http::alerts::AlertResponseBody;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_position, parse_optional_uuid, parse_uuid,
};

#[derive(Debug, Deserialize)]
struct ExecutionPath {
    execution_id: String,
}

fn parse_execution_id(path: ExecutionPath) -> Result<Uuid, Error> {
    parse_uuid(path.execution_id, FieldName::new("executionId"))
}

/// Request payload for starting an execution.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartExecutionRequestBody {
    #[schema(format = "uuid")]
    pub guard_id: Option<String>,
    pub device: Option<DeviceInfoBody>,
}

/// Device metadata reported by the guard's handset.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfoBody {
    pub fingerprint: Option<String>,
    pub model: Option<String>,
    pub os_version: Option<String>,
    pub app_version: Option<String>,
    pub battery_pct: Option<i16>,
}

/// Request payload for marking a checkpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkCheckpointRequestBody {
    /// Scan code read from the QR or NFC tag.
    pub scan_code: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub battery_pct: Option<i16>,
    pub movement_score: Option<f64>,
    pub photo_url: Option<String>,
    pub device_fingerprint: Option<String>,
}

/// Request payload for the panic button.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPanicRequestBody {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub note: Option<String>,
}

/// Request payload for reporting an incident.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportIncidentRequestBody {
    #[schema(format = "uuid")]
    pub checkpoint_id: Option<String>,
    pub kind: Option<String>,
    pub description: Option<String>,
    pub photo_url: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

/// Geographic position payload.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PositionBody {
    pub lat: f64,
    pub lng: f64,
}

impl From<GeoPoint> for PositionBody {
    fn from(value: GeoPoint) -> Self {
        Self {
            lat: value.lat(),
            lng: value.lng(),
        }
    }
}

/// Response payload for a round execution.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub template_id: String,
    #[schema(format = "uuid")]
    pub schedule_id: String,
    #[schema(format = "uuid")]
    pub installation_id: String,
    #[schema(format = "date-time")]
    pub scheduled_at: String,
    #[schema(format = "uuid")]
    pub guard_id: Option<String>,
    pub status: String,
    pub checkpoints_total: u32,
    pub checkpoints_completed: u32,
    pub completion_pct: u8,
    pub trust_score: u8,
    pub trust_band: String,
    #[schema(format = "date-time")]
    pub started_at: Option<String>,
    #[schema(format = "date-time")]
    pub completed_at: Option<String>,
    pub device: Option<DeviceInfoBody>,
}

/// Response payload for a checkpoint mark.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub execution_id: String,
    #[schema(format = "uuid")]
    pub checkpoint_id: String,
    #[schema(format = "date-time")]
    pub marked_at: String,
    pub position: Option<PositionBody>,
    pub distance_m: Option<f64>,
    pub geo_valid: bool,
    pub speed_from_prev_kmh: Option<f64>,
    pub movement_score: Option<f64>,
    pub battery_pct: Option<i16>,
    pub device_fingerprint: Option<String>,
    pub photo_url: Option<String>,
    /// Anomaly codes tripped by this scan, in stable order.
    pub anomalies: Vec<String>,
    pub trust_score: u8,
}

/// Response payload for an incident.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IncidentResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub execution_id: String,
    #[schema(format = "uuid")]
    pub checkpoint_id: Option<String>,
    pub kind: String,
    pub description: String,
    pub photo_url: Option<String>,
    pub position: Option<PositionBody>,
    #[schema(format = "date-time")]
    pub reported_at: String,
}

/// Response payload pairing the panic incident with its alert.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PanicResponseBody {
    pub incident: IncidentResponseBody,
    pub alert: AlertResponseBody,
}

impl From<DeviceInfo> for DeviceInfoBody {
    fn from(value: DeviceInfo) -> Self {
        Self {
            fingerprint: value.fingerprint,
            model: value.model,
            os_version: value.os_version,
            app_version: value.app_version,
            battery_pct: value.battery_pct,
        }
    }
}

impl From<DeviceInfoBody> for DeviceInfo {
    fn from(value: DeviceInfoBody) -> Self {
        Self {
            fingerprint: value.fingerprint,
            model: value.model,
            os_version: value.os_version,
            app_version: value.app_version,
            battery_pct: value.battery_pct,
        }
    }
}

impl From<ExecutionPayload> for ExecutionResponseBody {
    fn from(value: ExecutionPayload) -> Self {
        Self {
            id: value.id.to_string(),
            template_id: value.template_id.to_string(),
            schedule_id: value.schedule_id.to_string(),
            installation_id: value.installation_id.to_string(),
            scheduled_at: value.scheduled_at.to_rfc3339(),
            guard_id: value.guard_id.map(|id| id.to_string()),
            status: value.status.as_str().to_owned(),
            checkpoints_total: value.checkpoints_total,
            checkpoints_completed: value.checkpoints_completed,
            completion_pct: value.completion_pct,
            trust_score: value.trust_score,
            trust_band: value.trust_band.as_str().to_owned(),
            started_at: value.started_at.map(|at| at.to_rfc3339()),
            completed_at: value.completed_at.map(|at| at.to_rfc3339()),
            device: value.device.map(DeviceInfoBody::from),
        }
    }
}

impl From<MarkPayload> for MarkResponseBody {
    fn from(value: MarkPayload) -> Self {
        Self {
            id: value.id.to_string(),
            execution_id: value.execution_id.to_string(),
            checkpoint_id: value.checkpoint_id.to_string(),
            marked_at: value.marked_at.to_rfc3339(),
            position: value.position.map(PositionBody::from),
            distance_m: value.distance_m,
            geo_valid: value.geo_valid,
            speed_from_prev_kmh: value.speed_from_prev_kmh,
            movement_score: value.movement_score,
            battery_pct: value.battery_pct,
            device_fingerprint: value.device_fingerprint,
            photo_url: value.photo_url,
            anomalies: value
                .anomalies
                .into_iter()
                .map(|code| code.as_str().to_owned())
                .collect(),
            trust_score: value.trust_score,
        }
    }
}

impl From<IncidentPayload> for IncidentResponseBody {
    fn from(value: IncidentPayload) -> Self {
        Self {
            id: value.id.to_string(),
            execution_id: value.execution_id.to_string(),
            checkpoint_id: value.checkpoint_id.map(|id| id.to_string()),
            kind: value.kind,
            description: value.description,
            photo_url: value.photo_url,
            position: value.position.map(PositionBody::from),
            reported_at: value.reported_at.to_rfc3339(),
        }
    }
}

impl From<PanicPayload> for PanicResponseBody {
    fn from(value: PanicPayload) -> Self {
        Self {
            incident: IncidentResponseBody::from(value.incident),
            alert: AlertResponseBody::from(value.alert),
        }
    }
}

fn parse_start_request(
    execution_id: Uuid,
    payload: StartExecutionRequestBody,
) -> Result<StartExecutionRequest, Error> {
    let guard_id = payload
        .guard_id
        .ok_or_else(|| missing_field_error(FieldName::new("guardId")))?;
    Ok(StartExecutionRequest {
        execution_id,
        guard_id: parse_uuid(guard_id, FieldName::new("guardId"))?,
        device: payload.device.map(DeviceInfo::from),
    })
}

fn parse_mark_request(
    execution_id: Uuid,
    payload: MarkCheckpointRequestBody,
) -> Result<MarkCheckpointRequest, Error> {
    let scan_code = payload
        .scan_code
        .ok_or_else(|| missing_field_error(FieldName::new("scanCode")))?;
    Ok(MarkCheckpointRequest {
        execution_id,
        scan_code,
        position: parse_optional_position(payload.lat, payload.lng)?,
        battery_pct: payload.battery_pct,
        movement_score: payload.movement_score,
        photo_url: payload.photo_url,
        device_fingerprint: payload.device_fingerprint,
    })
}

fn parse_panic_request(
    execution_id: Uuid,
    payload: TriggerPanicRequestBody,
) -> Result<TriggerPanicRequest, Error> {
    Ok(TriggerPanicRequest {
        execution_id,
        position: parse_optional_position(payload.lat, payload.lng)?,
        note: payload.note,
    })
}

fn parse_incident_request(
    execution_id: Uuid,
    payload: ReportIncidentRequestBody,
) -> Result<ReportIncidentRequest, Error> {
    let kind = payload
        .kind
        .ok_or_else(|| missing_field_error(FieldName::new("kind")))?;
    let description = payload
        .description
        .ok_or_else(|| missing_field_error(FieldName::new("description")))?;
    Ok(ReportIncidentRequest {
        execution_id,
        checkpoint_id: parse_optional_uuid(payload.checkpoint_id, FieldName::new("checkpointId"))?,
        kind,
        description,
        photo_url: payload.photo_url,
        position: parse_optional_position(payload.lat, payload.lng)?,
    })
}

/// Move a scheduled round to `in_progress` for the assigned guard.
#[utoipa::path(
    post,
    path = "/api/v1/executions/{execution_id}/start",
    request_body = StartExecutionRequestBody,
    params(
        ("execution_id" = String, Path, description = "Round execution identifier")
    ),
    responses(
        (status = 200, description = "Execution started", body = ExecutionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Execution already settled", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["executions"],
    operation_id = "startExecution"
)]
#[post("/executions/{execution_id}/start")]
pub async fn start_execution(
    state: web::Data<HttpState>,
    path: web::Path<ExecutionPath>,
    payload: web::Json<StartExecutionRequestBody>,
) -> ApiResult<web::Json<ExecutionResponseBody>> {
    let execution_id = parse_execution_id(path.into_inner())?;
    let request = parse_start_request(execution_id, payload.into_inner())?;
    let response = state.patrol.start_execution(request).await?;
    Ok(web::Json(ExecutionResponseBody::from(response)))
}

/// Record a checkpoint scan against an in-progress round.
#[utoipa::path(
    post,
    path = "/api/v1/executions/{execution_id}/marks",
    request_body = MarkCheckpointRequestBody,
    params(
        ("execution_id" = String, Path, description = "Round execution identifier")
    ),
    responses(
        (status = 200, description = "Checkpoint marked", body = MarkResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Execution already settled", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["executions"],
    operation_id = "markCheckpoint"
)]
#[post("/executions/{execution_id}/marks")]
pub async fn mark_checkpoint(
    state: web::Data<HttpState>,
    path: web::Path<ExecutionPath>,
    payload: web::Json<MarkCheckpointRequestBody>,
) -> ApiResult<web::Json<MarkResponseBody>> {
    let execution_id = parse_execution_id(path.into_inner())?;
    let request = parse_mark_request(execution_id, payload.into_inner())?;
    let response = state.patrol.mark_checkpoint(request).await?;
    Ok(web::Json(MarkResponseBody::from(response)))
}

/// Close a round and settle its final status and trust score.
#[utoipa::path(
    post,
    path = "/api/v1/executions/{execution_id}/complete",
    params(
        ("execution_id" = String, Path, description = "Round execution identifier")
    ),
    responses(
        (status = 200, description = "Execution settled", body = ExecutionResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Execution already settled", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["executions"],
    operation_id = "completeExecution"
)]
#[post("/executions/{execution_id}/complete")]
pub async fn complete_execution(
    state: web::Data<HttpState>,
    path: web::Path<ExecutionPath>,
) -> ApiResult<web::Json<ExecutionResponseBody>> {
    let execution_id = parse_execution_id(path.into_inner())?;
    let response = state
        .patrol
        .complete_execution(CompleteExecutionRequest { execution_id })
        .await?;
    Ok(web::Json(ExecutionResponseBody::from(response)))
}

/// Raise a duress signal from an active round.
#[utoipa::path(
    post,
    path = "/api/v1/executions/{execution_id}/panic",
    request_body = TriggerPanicRequestBody,
    params(
        ("execution_id" = String, Path, description = "Round execution identifier")
    ),
    responses(
        (status = 200, description = "Panic recorded", body = PanicResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "No guard assigned", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["executions"],
    operation_id = "triggerPanic"
)]
#[post("/executions/{execution_id}/panic")]
pub async fn trigger_panic(
    state: web::Data<HttpState>,
    path: web::Path<ExecutionPath>,
    payload: web::Json<TriggerPanicRequestBody>,
) -> ApiResult<web::Json<PanicResponseBody>> {
    let execution_id = parse_execution_id(path.into_inner())?;
    let request = parse_panic_request(execution_id, payload.into_inner())?;
    let response = state.patrol.trigger_panic(request).await?;
    Ok(web::Json(PanicResponseBody::from(response)))
}

/// Report a freeform incident observed during a round.
#[utoipa::path(
    post,
    path = "/api/v1/executions/{execution_id}/incidents",
    request_body = ReportIncidentRequestBody,
    params(
        ("execution_id" = String, Path, description = "Round execution identifier")
    ),
    responses(
        (status = 200, description = "Incident recorded", body = IncidentResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["executions"],
    operation_id = "reportIncident"
)]
#[post("/executions/{execution_id}/incidents")]
pub async fn report_incident(
    state: web::Data<HttpState>,
    path: web::Path<ExecutionPath>,
    payload: web::Json<ReportIncidentRequestBody>,
) -> ApiResult<web::Json<IncidentResponseBody>> {
    let execution_id = parse_execution_id(path.into_inner())?;
    let request = parse_incident_request(execution_id, payload.into_inner())?;
    let response = state.patrol.report_incident(request).await?;
    Ok(web::Json(IncidentResponseBody::from(response)))
}

#[cfg(test)]
#[path = "executions_tests.rs"]
mod tests;
