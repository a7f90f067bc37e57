//! Alert HTTP handlers.
//!
//! ```text
//! GET /api/v1/alerts
//! POST /api/v1/alerts/{alert_id}/resolve
//! ```

use actix_web::{get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{AlertPayload, ListAlertsRequest, ResolveAlertRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_optional_uuid, parse_uuid,
};

#[derive(Debug, Deserialize)]
struct AlertPath {
    alert_id: String,
}

fn parse_alert_id(path: AlertPath) -> Result<Uuid, Error> {
    parse_uuid(path.alert_id, FieldName::new("alertId"))
}

/// Query parameters for listing alerts.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsQuery {
    /// Restrict results to one installation.
    #[schema(format = "uuid")]
    pub installation_id: Option<String>,
    /// When true, only alerts that have not been resolved are returned.
    pub unresolved_only: Option<bool>,
}

/// Request payload for resolving an alert.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResolveAlertRequestBody {
    #[schema(format = "uuid")]
    pub resolver_id: Option<String>,
}

/// Response payload for an alert.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponseBody {
    #[schema(format = "uuid")]
    pub id: String,
    #[schema(format = "uuid")]
    pub installation_id: String,
    #[schema(format = "uuid")]
    pub execution_id: Option<String>,
    pub kind: String,
    pub severity: String,
    pub message: String,
    /// Structured context such as the anomaly codes behind the alert.
    pub payload: Option<serde_json::Value>,
    pub resolved: bool,
    #[schema(format = "uuid")]
    pub resolved_by: Option<String>,
    #[schema(format = "date-time")]
    pub resolved_at: Option<String>,
}

/// Response payload for an alert listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsResponseBody {
    pub alerts: Vec<AlertResponseBody>,
}

impl From<AlertPayload> for AlertResponseBody {
    fn from(value: AlertPayload) -> Self {
        Self {
            id: value.id.to_string(),
            installation_id: value.installation_id.to_string(),
            execution_id: value.execution_id.map(|id| id.to_string()),
            kind: value.kind.as_str().to_owned(),
            severity: value.severity.as_str().to_owned(),
            message: value.message,
            payload: value.payload,
            resolved: value.resolved,
            resolved_by: value.resolved_by.map(|id| id.to_string()),
            resolved_at: value.resolved_at.map(|at| at.to_rfc3339()),
        }
    }
}

fn parse_list_query(query: ListAlertsQuery) -> Result<ListAlertsRequest, Error> {
    Ok(ListAlertsRequest {
        installation_id: parse_optional_uuid(
            query.installation_id,
            FieldName::new("installationId"),
        )?,
        unresolved_only: query.unresolved_only.unwrap_or(false),
    })
}

/// List alerts, newest first, with unresolved ones leading.
#[utoipa::path(
    get,
    path = "/api/v1/alerts",
    params(
        ("installationId" = Option<String>, Query, description = "Restrict to one installation"),
        ("unresolvedOnly" = Option<bool>, Query, description = "Return only unresolved alerts")
    ),
    responses(
        (status = 200, description = "Alert listing", body = ListAlertsResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "listAlerts"
)]
#[get("/alerts")]
pub async fn list_alerts(
    state: web::Data<HttpState>,
    query: web::Query<ListAlertsQuery>,
) -> ApiResult<web::Json<ListAlertsResponseBody>> {
    let request = parse_list_query(query.into_inner())?;
    let response = state.alert_queries.list_alerts(request).await?;
    Ok(web::Json(ListAlertsResponseBody {
        alerts: response
            .alerts
            .into_iter()
            .map(AlertResponseBody::from)
            .collect(),
    }))
}

/// Mark an alert as resolved by an operator.
#[utoipa::path(
    post,
    path = "/api/v1/alerts/{alert_id}/resolve",
    request_body = ResolveAlertRequestBody,
    params(
        ("alert_id" = String, Path, description = "Alert identifier")
    ),
    responses(
        (status = 200, description = "Alert resolved", body = AlertResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Already resolved", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["alerts"],
    operation_id = "resolveAlert"
)]
#[post("/alerts/{alert_id}/resolve")]
pub async fn resolve_alert(
    state: web::Data<HttpState>,
    path: web::Path<AlertPath>,
    payload: web::Json<ResolveAlertRequestBody>,
) -> ApiResult<web::Json<AlertResponseBody>> {
    let alert_id = parse_alert_id(path.into_inner())?;
    let resolver_id = payload
        .into_inner()
        .resolver_id
        .ok_or_else(|| missing_field_error(FieldName::new("resolverId")))?;
    let response = state
        .alert_commands
        .resolve_alert(ResolveAlertRequest {
            alert_id,
            resolver_id: parse_uuid(resolver_id, FieldName::new("resolverId"))?,
        })
        .await?;
    Ok(web::Json(AlertResponseBody::from(response)))
}

#[cfg(test)]
#[path = "alerts_tests.rs"]
mod tests;
