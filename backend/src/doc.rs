//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: All HTTP endpoints from the inbound layer (executions,
//!   schedules, alerts, monitoring, health)
//! - **Schemas**: Request and response bodies plus domain type wrappers
//!   ([`ErrorSchema`], [`ErrorCodeSchema`]) that provide OpenAPI definitions
//!   without coupling domain types to the utoipa framework
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi_dump` for external tooling.

use utoipa::OpenApi;

use crate::inbound::http::alerts::{
    AlertResponseBody, ListAlertsQuery, ListAlertsResponseBody, ResolveAlertRequestBody,
};
use crate::inbound::http::executions::{
    DeviceInfoBody, ExecutionResponseBody, IncidentResponseBody, MarkCheckpointRequestBody,
    MarkResponseBody, PanicResponseBody, PositionBody, ReportIncidentRequestBody,
    StartExecutionRequestBody, TriggerPanicRequestBody,
};
use crate::inbound::http::monitoring::{
    ActivePatrolBody, ListActiveExecutionsQuery, ListActiveExecutionsResponseBody,
};
use crate::inbound::http::schedules::{
    GenerateRequestBody, GenerationPassResponseBody, GenerationReportBody,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Patrol engine API",
        description = "HTTP interface for patrol round scheduling, execution \
                       tracking, and alerting.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::executions::start_execution,
        crate::inbound::http::executions::mark_checkpoint,
        crate::inbound::http::executions::complete_execution,
        crate::inbound::http::executions::trigger_panic,
        crate::inbound::http::executions::report_incident,
        crate::inbound::http::schedules::generate_for_schedule,
        crate::inbound::http::schedules::run_generation_pass,
        crate::inbound::http::alerts::list_alerts,
        crate::inbound::http::alerts::resolve_alert,
        crate::inbound::http::monitoring::list_active_executions,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        StartExecutionRequestBody,
        MarkCheckpointRequestBody,
        TriggerPanicRequestBody,
        ReportIncidentRequestBody,
        DeviceInfoBody,
        PositionBody,
        ExecutionResponseBody,
        MarkResponseBody,
        IncidentResponseBody,
        PanicResponseBody,
        GenerateRequestBody,
        GenerationReportBody,
        GenerationPassResponseBody,
        ListAlertsQuery,
        ResolveAlertRequestBody,
        AlertResponseBody,
        ListAlertsResponseBody,
        ListActiveExecutionsQuery,
        ActivePatrolBody,
        ListActiveExecutionsResponseBody,
        ErrorSchema,
        ErrorCodeSchema,
    )),
    tags(
        (name = "executions", description = "Guard-facing round execution lifecycle"),
        (name = "schedules", description = "Patrol slot generation"),
        (name = "alerts", description = "Operator alert listing and resolution"),
        (name = "monitoring", description = "Live patrol monitoring"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
