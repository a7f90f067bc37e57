//! Schedule slot generation HTTP handlers.
//!
//! ```text
//! POST /api/v1/schedules/{schedule_id}/generate
//! POST /api/v1/schedules/generate
//! ```

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{
    GenerateForScheduleRequest, GenerationReport, RunGenerationPassRequest,
};
use crate::domain::{Error, SlotWindow};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_rfc3339_timestamp, parse_uuid};

#[derive(Debug, Deserialize)]
struct SchedulePath {
    schedule_id: String,
}

fn parse_schedule_id(path: SchedulePath) -> Result<Uuid, Error> {
    parse_uuid(path.schedule_id, FieldName::new("scheduleId"))
}

/// Request payload for slot generation.
///
/// Both window bounds are optional; when omitted the service derives its
/// window from the clock and the configured lookahead.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequestBody {
    #[schema(format = "date-time")]
    pub window_from: Option<String>,
    #[schema(format = "date-time")]
    pub window_to: Option<String>,
}

/// Response payload reporting one schedule's generation outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReportBody {
    #[schema(format = "uuid")]
    pub schedule_id: String,
    #[schema(format = "uuid")]
    pub template_id: String,
    pub slots: u32,
    pub created: u32,
    pub already_scheduled: u32,
}

/// Response payload for a whole generation pass.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPassResponseBody {
    pub reports: Vec<GenerationReportBody>,
}

impl From<GenerationReport> for GenerationReportBody {
    fn from(value: GenerationReport) -> Self {
        Self {
            schedule_id: value.schedule_id.to_string(),
            template_id: value.template_id.to_string(),
            slots: value.slots,
            created: value.created,
            already_scheduled: value.already_scheduled,
        }
    }
}

fn parse_window(payload: GenerateRequestBody) -> Result<Option<SlotWindow>, Error> {
    let (from, to) = match (payload.window_from, payload.window_to) {
        (Some(from), Some(to)) => (from, to),
        (None, None) => return Ok(None),
        (Some(_), None) => {
            return Err(half_window_error("windowFrom", "windowTo"));
        }
        (None, Some(_)) => {
            return Err(half_window_error("windowTo", "windowFrom"));
        }
    };

    let from = parse_rfc3339_timestamp(from, FieldName::new("windowFrom"))?;
    let to = parse_rfc3339_timestamp(to, FieldName::new("windowTo"))?;
    let window = SlotWindow::new(from, to).map_err(|_| {
        Error::invalid_request("windowTo must not precede windowFrom").with_details(json!({
            "field": "windowTo",
            "code": "inverted_window",
        }))
    })?;
    Ok(Some(window))
}

fn half_window_error(present: &str, missing: &str) -> Error {
    Error::invalid_request(format!("{present} must be provided together with {missing}"))
        .with_details(json!({
            "field": missing,
            "code": "missing_field",
        }))
}

/// Generate pending executions for one schedule.
#[utoipa::path(
    post,
    path = "/api/v1/schedules/{schedule_id}/generate",
    request_body = GenerateRequestBody,
    params(
        ("schedule_id" = String, Path, description = "Round schedule identifier")
    ),
    responses(
        (status = 200, description = "Generation report", body = GenerationReportBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Schedule inactive", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["schedules"],
    operation_id = "generateForSchedule"
)]
#[post("/schedules/{schedule_id}/generate")]
pub async fn generate_for_schedule(
    state: web::Data<HttpState>,
    path: web::Path<SchedulePath>,
    payload: web::Json<GenerateRequestBody>,
) -> ApiResult<web::Json<GenerationReportBody>> {
    let schedule_id = parse_schedule_id(path.into_inner())?;
    let window = parse_window(payload.into_inner())?;
    let response = state
        .slot_generation
        .generate_for_schedule(GenerateForScheduleRequest {
            schedule_id,
            window,
        })
        .await?;
    Ok(web::Json(GenerationReportBody::from(response)))
}

/// Run a generation pass over every active schedule.
#[utoipa::path(
    post,
    path = "/api/v1/schedules/generate",
    request_body = GenerateRequestBody,
    responses(
        (status = 200, description = "Generation pass report", body = GenerationPassResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["schedules"],
    operation_id = "runGenerationPass"
)]
#[post("/schedules/generate")]
pub async fn run_generation_pass(
    state: web::Data<HttpState>,
    payload: web::Json<GenerateRequestBody>,
) -> ApiResult<web::Json<GenerationPassResponseBody>> {
    let window = parse_window(payload.into_inner())?;
    let reports = state
        .slot_generation
        .run_generation_pass(RunGenerationPassRequest { window })
        .await?;
    Ok(web::Json(GenerationPassResponseBody {
        reports: reports.into_iter().map(GenerationReportBody::from).collect(),
    }))
}

#[cfg(test)]
#[path = "schedules_tests.rs"]
mod tests;
