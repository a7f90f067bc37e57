//! Tests for alert HTTP handlers.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{ListAlertsResponse, MockAlertCommand, MockAlertQuery};
use crate::domain::trust::AlertSeverity;
use crate::domain::AlertKind;
use crate::inbound::http::state::HttpStatePorts;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

const ALERT_ID: &str = "00000000-0000-0000-0000-000000000701";
const RESOLVER_ID: &str = "00000000-0000-0000-0000-000000000702";
const INSTALLATION_ID: &str = "00000000-0000-0000-0000-000000000703";

fn test_app_with(
    ports: HttpStatePorts,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(ports);
    App::new()
        .app_data(web::Data::new(state))
        .service(web::scope("/api/v1").service(list_alerts).service(resolve_alert))
}

fn unresolved_alert(id: Uuid, installation_id: Uuid) -> AlertPayload {
    AlertPayload {
        id,
        installation_id,
        execution_id: Some(Uuid::new_v4()),
        kind: AlertKind::Anomaly,
        severity: AlertSeverity::Warning,
        message: "checkpoint QR-001 marked with anomalies: abnormal_speed".to_owned(),
        payload: Some(serde_json::json!({"anomalies": ["abnormal_speed"]})),
        resolved: false,
        resolved_by: None,
        resolved_at: None,
    }
}

#[actix_web::test]
async fn list_alerts_returns_empty_listing_from_fixture() {
    let app = actix_test::init_service(test_app_with(HttpStatePorts::default())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/alerts")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("alerts"), Some(&serde_json::json!([])));
}

#[actix_web::test]
async fn list_alerts_forwards_filters_to_the_query_port() {
    let alert_id: Uuid = ALERT_ID.parse().expect("valid alert id");
    let installation_id: Uuid = INSTALLATION_ID.parse().expect("valid installation id");

    let mut queries = MockAlertQuery::new();
    queries
        .expect_list_alerts()
        .withf(move |request| {
            request.installation_id == Some(installation_id) && request.unresolved_only
        })
        .returning(move |_| {
            Ok(ListAlertsResponse {
                alerts: vec![unresolved_alert(alert_id, installation_id)],
            })
        });

    let app = actix_test::init_service(test_app_with(HttpStatePorts {
        alert_queries: Arc::new(queries),
        ..HttpStatePorts::default()
    }))
    .await;

    let request = actix_test::TestRequest::get()
        .uri(&format!(
            "/api/v1/alerts?installationId={INSTALLATION_ID}&unresolvedOnly=true"
        ))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/alerts/0/id").and_then(Value::as_str),
        Some(ALERT_ID)
    );
    assert_eq!(
        body.pointer("/alerts/0/severity").and_then(Value::as_str),
        Some("warning")
    );
    assert_eq!(
        body.pointer("/alerts/0/resolved").and_then(Value::as_bool),
        Some(false)
    );
}

#[actix_web::test]
async fn list_alerts_rejects_malformed_installation_id() {
    let app = actix_test::init_service(test_app_with(HttpStatePorts::default())).await;

    let request = actix_test::TestRequest::get()
        .uri("/api/v1/alerts?installationId=not-a-uuid")
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("installationId")
    );
}

#[actix_web::test]
async fn resolve_alert_returns_the_resolved_payload() {
    let alert_id: Uuid = ALERT_ID.parse().expect("valid alert id");
    let resolver_id: Uuid = RESOLVER_ID.parse().expect("valid resolver id");
    let installation_id: Uuid = INSTALLATION_ID.parse().expect("valid installation id");

    let mut commands = MockAlertCommand::new();
    commands
        .expect_resolve_alert()
        .withf(move |request| {
            request.alert_id == alert_id && request.resolver_id == resolver_id
        })
        .returning(move |request| {
            let mut alert = unresolved_alert(request.alert_id, installation_id);
            alert.resolved = true;
            alert.resolved_by = Some(request.resolver_id);
            alert.resolved_at = Some(Utc::now());
            Ok(alert)
        });

    let app = actix_test::init_service(test_app_with(HttpStatePorts {
        alert_commands: Arc::new(commands),
        ..HttpStatePorts::default()
    }))
    .await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/alerts/{ALERT_ID}/resolve"))
        .set_json(serde_json::json!({"resolverId": RESOLVER_ID}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("resolved").and_then(Value::as_bool), Some(true));
    assert_eq!(
        body.get("resolvedBy").and_then(Value::as_str),
        Some(RESOLVER_ID)
    );
    assert!(body.get("resolvedAt").and_then(Value::as_str).is_some());
}

#[actix_web::test]
async fn resolve_alert_unknown_alert_is_not_found() {
    let app = actix_test::init_service(test_app_with(HttpStatePorts::default())).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/alerts/{ALERT_ID}/resolve"))
        .set_json(serde_json::json!({"resolverId": RESOLVER_ID}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn resolve_alert_requires_resolver_id() {
    let app = actix_test::init_service(test_app_with(HttpStatePorts::default())).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/alerts/{ALERT_ID}/resolve"))
        .set_json(serde_json::json!({}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("resolverId")
    );
}

#[actix_web::test]
async fn resolve_alert_rejects_malformed_alert_id() {
    let app = actix_test::init_service(test_app_with(HttpStatePorts::default())).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/alerts/not-a-uuid/resolve")
        .set_json(serde_json::json!({"resolverId": RESOLVER_ID}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
