//! Tests for patrol execution HTTP handlers.

use super::*;
use crate::inbound::http::state::HttpStatePorts;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use serde_json::Value;

const EXECUTION_ID: &str = "00000000-0000-0000-0000-000000000601";
const GUARD_ID: &str = "00000000-0000-0000-0000-000000000602";

fn test_app() -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(HttpStatePorts::default());
    App::new().app_data(web::Data::new(state)).service(
        web::scope("/api/v1")
            .service(start_execution)
            .service(mark_checkpoint)
            .service(complete_execution)
            .service(trigger_panic)
            .service(report_incident),
    )
}

#[actix_web::test]
async fn start_execution_returns_in_progress_round() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/start"))
        .set_json(serde_json::json!({"guardId": GUARD_ID}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("id").and_then(Value::as_str), Some(EXECUTION_ID));
    assert_eq!(body.get("guardId").and_then(Value::as_str), Some(GUARD_ID));
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some("in_progress")
    );
    assert!(body.get("startedAt").and_then(Value::as_str).is_some());
}

#[actix_web::test]
async fn start_execution_rejects_malformed_execution_id() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri("/api/v1/executions/not-a-uuid/start")
        .set_json(serde_json::json!({"guardId": GUARD_ID}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn start_execution_requires_guard_id() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/start"))
        .set_json(serde_json::json!({}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("guardId")
    );
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("missing_field")
    );
}

#[actix_web::test]
async fn mark_checkpoint_reports_scored_scan() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/marks"))
        .set_json(serde_json::json!({
            "scanCode": "QR-001",
            "batteryPct": 80,
            "movementScore": 0.4
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("executionId").and_then(Value::as_str),
        Some(EXECUTION_ID)
    );
    let anomalies: Vec<&str> = body
        .get("anomalies")
        .and_then(Value::as_array)
        .expect("anomalies array")
        .iter()
        .filter_map(Value::as_str)
        .collect();
    // The fixture cannot resolve a checkpoint position, so the geo rule fires.
    assert!(anomalies.contains(&"geo_out_of_range"));
    let trust = body
        .get("trustScore")
        .and_then(Value::as_u64)
        .expect("trust score");
    assert!(trust < 100);
}

#[actix_web::test]
async fn mark_checkpoint_rejects_unpaired_coordinates() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/marks"))
        .set_json(serde_json::json!({
            "scanCode": "QR-001",
            "lat": -33.45
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("lng")
    );
}

#[actix_web::test]
async fn mark_checkpoint_rejects_out_of_range_latitude() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/marks"))
        .set_json(serde_json::json!({
            "scanCode": "QR-001",
            "lat": 91.0,
            "lng": -70.66
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/code").and_then(Value::as_str),
        Some("invalid_coordinate")
    );
}

#[actix_web::test]
async fn complete_execution_returns_settled_round() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/complete"))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.get("status").and_then(Value::as_str),
        Some("completed")
    );
    assert!(body.get("completedAt").and_then(Value::as_str).is_some());
}

#[actix_web::test]
async fn trigger_panic_pairs_incident_and_critical_alert() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/panic"))
        .set_json(serde_json::json!({"note": "intruder at the gate"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/incident/kind").and_then(Value::as_str),
        Some("panic")
    );
    assert_eq!(
        body.pointer("/incident/description").and_then(Value::as_str),
        Some("intruder at the gate")
    );
    assert_eq!(
        body.pointer("/alert/kind").and_then(Value::as_str),
        Some("panic")
    );
    assert_eq!(
        body.pointer("/alert/severity").and_then(Value::as_str),
        Some("critical")
    );
    assert_eq!(
        body.pointer("/alert/executionId").and_then(Value::as_str),
        Some(EXECUTION_ID)
    );
}

#[actix_web::test]
async fn report_incident_echoes_freeform_kind() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/incidents"))
        .set_json(serde_json::json!({
            "kind": "broken_lock",
            "description": "padlock cut at the service gate"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(body.get("kind").and_then(Value::as_str), Some("broken_lock"));
    assert_eq!(
        body.get("description").and_then(Value::as_str),
        Some("padlock cut at the service gate")
    );
}

#[actix_web::test]
async fn report_incident_rejects_reserved_panic_kind() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/incidents"))
        .set_json(serde_json::json!({
            "kind": "panic",
            "description": "should use the panic button"
        }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn report_incident_requires_description() {
    let app = actix_test::init_service(test_app()).await;

    let request = actix_test::TestRequest::post()
        .uri(&format!("/api/v1/executions/{EXECUTION_ID}/incidents"))
        .set_json(serde_json::json!({"kind": "broken_lock"}))
        .to_request();
    let response = actix_test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(response).await;
    assert_eq!(
        body.pointer("/details/field").and_then(Value::as_str),
        Some("description")
    );
}
