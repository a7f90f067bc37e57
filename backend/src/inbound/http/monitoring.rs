//! Live monitoring HTTP handlers.
//!
//! ```text
//! GET /api/v1/executions/active
//! ```

use actix_web::{get, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{ActivePatrolPayload, ListActiveExecutionsRequest};
use crate::inbound::http::ApiResult;
use crate::inbound::http::executions::{ExecutionResponseBody, MarkResponseBody};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_optional_uuid};

/// Query parameters for the active executions listing.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListActiveExecutionsQuery {
    /// Restrict results to one installation.
    #[schema(format = "uuid")]
    pub installation_id: Option<String>,
}

/// Response payload for one in-progress patrol.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivePatrolBody {
    pub execution: ExecutionResponseBody,
    pub template_name: String,
    /// Most recent checkpoint mark, when the guard has marked any.
    pub latest_mark: Option<MarkResponseBody>,
}

/// Response payload for the active executions listing.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListActiveExecutionsResponseBody {
    pub patrols: Vec<ActivePatrolBody>,
}

impl From<ActivePatrolPayload> for ActivePatrolBody {
    fn from(value: ActivePatrolPayload) -> Self {
        Self {
            execution: ExecutionResponseBody::from(value.execution),
            template_name: value.template_name,
            latest_mark: value.latest_mark.map(MarkResponseBody::from),
        }
    }
}

fn parse_query(query: ListActiveExecutionsQuery) -> Result<ListActiveExecutionsRequest, Error> {
    Ok(ListActiveExecutionsRequest {
        installation_id: parse_optional_uuid(
            query.installation_id,
            FieldName::new("installationId"),
        )?,
    })
}

/// List patrols currently in progress for the control panel.
#[utoipa::path(
    get,
    path = "/api/v1/executions/active",
    params(
        ("installationId" = Option<String>, Query, description = "Restrict to one installation")
    ),
    responses(
        (status = 200, description = "Active patrols", body = ListActiveExecutionsResponseBody),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["monitoring"],
    operation_id = "listActiveExecutions"
)]
#[get("/executions/active")]
pub async fn list_active_executions(
    state: web::Data<HttpState>,
    query: web::Query<ListActiveExecutionsQuery>,
) -> ApiResult<web::Json<ListActiveExecutionsResponseBody>> {
    let request = parse_query(query.into_inner())?;
    let response = state.monitoring.list_active_executions(request).await?;
    Ok(web::Json(ListActiveExecutionsResponseBody {
        patrols: response
            .patrols
            .into_iter()
            .map(ActivePatrolBody::from)
            .collect(),
    }))
}

#[cfg(test)]
#[path = "monitoring_tests.rs"]
mod tests;
