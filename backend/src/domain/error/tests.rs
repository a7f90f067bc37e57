//! Tests for error construction, request id capture, and the wire shape.

use super::*;
use crate::domain::request_id::RequestId;
use rstest::{fixture, rstest};
use serde_json::json;

const REQUEST_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case::invalid_request(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case::not_found(Error::not_found("missing"), ErrorCode::NotFound)]
#[case::invalid_state(Error::invalid_state("finished"), ErrorCode::InvalidState)]
#[case::conflict(Error::conflict("raced"), ErrorCode::Conflict)]
#[case::service_unavailable(Error::service_unavailable("db down"), ErrorCode::ServiceUnavailable)]
#[case::internal(Error::internal("boom"), ErrorCode::InternalError)]
fn convenience_constructors_set_codes(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_blank_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn try_with_request_id_rejects_blank_values(base_error: Error) {
    let result = base_error.try_with_request_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyRequestId)));
}

#[rstest]
fn with_details_round_trips(base_error: Error) {
    let error = base_error.with_details(json!({"field": "scanCode"}));
    assert_eq!(error.details(), Some(&json!({"field": "scanCode"})));
}

#[rstest]
fn construction_outside_scope_leaves_request_id_unset(base_error: Error) {
    assert_eq!(base_error.request_id(), None);
}

#[tokio::test]
async fn construction_captures_ambient_request_id() {
    let id = RequestId::generate();
    let error = id.scope(async { Error::not_found("missing") }).await;
    assert_eq!(error.request_id(), Some(id.to_string().as_str()));
}

#[rstest]
fn display_prints_the_message(base_error: Error) {
    assert_eq!(base_error.to_string(), "bad");
}

#[rstest]
fn serializes_to_camel_case_wire_shape() {
    let error = Error::invalid_state("round already finished")
        .with_request_id(REQUEST_ID)
        .with_details(json!({"status": "completed"}));
    let value = serde_json::to_value(&error).expect("error serializes");
    assert_eq!(
        value,
        json!({
            "code": "invalid_state",
            "message": "round already finished",
            "requestId": REQUEST_ID,
            "details": {"status": "completed"},
        })
    );
}

#[rstest]
fn serialization_omits_absent_optional_fields(base_error: Error) {
    let value = serde_json::to_value(&base_error).expect("error serializes");
    assert_eq!(value, json!({"code": "invalid_request", "message": "bad"}));
}

#[tokio::test]
async fn deserialization_uses_the_wire_request_id() {
    let ambient = RequestId::generate();
    let error: Error = ambient
        .scope(async {
            serde_json::from_value(json!({
                "code": "conflict",
                "message": "alert already resolved",
                "requestId": REQUEST_ID,
            }))
        })
        .await
        .expect("payload deserializes");
    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.request_id(), Some(REQUEST_ID));
}

#[tokio::test]
async fn deserialization_without_request_id_stays_unset() {
    let ambient = RequestId::generate();
    let error: Error = ambient
        .scope(async {
            serde_json::from_value(json!({
                "code": "not_found",
                "message": "missing",
            }))
        })
        .await
        .expect("payload deserializes");
    assert_eq!(error.request_id(), None);
}

#[rstest]
fn deserialization_rejects_blank_messages() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({"code": "not_found", "message": "  "}));
    assert!(result.is_err());
}

#[rstest]
fn deserialization_rejects_blank_request_ids() {
    let result: Result<Error, _> = serde_json::from_value(json!({
        "code": "not_found",
        "message": "missing",
        "requestId": " ",
    }));
    assert!(result.is_err());
}
