//! Tests for the alert service.

use std::sync::Arc;

use chrono::Utc;
use mockable::DefaultClock;
use serde_json::json;
use uuid::Uuid;

use super::*;
use crate::domain::ports::MockAlertRepository;
use crate::domain::trust::AlertSeverity;
use crate::domain::{Alert, AlertDraft, AlertKind, ErrorCode};

fn service(alerts: MockAlertRepository) -> AlertService<MockAlertRepository> {
    AlertService::new(Arc::new(alerts), Arc::new(DefaultClock))
}

fn unresolved_alert() -> Alert {
    Alert::new(AlertDraft {
        id: Uuid::new_v4(),
        installation_id: Uuid::new_v4(),
        execution_id: Some(Uuid::new_v4()),
        kind: AlertKind::Anomaly,
        severity: AlertSeverity::Warning,
        message: "checkpoint QR-001 marked with anomalies: abnormal_speed".to_owned(),
        payload: Some(json!({"anomalies": ["abnormal_speed"]})),
        resolved: false,
        resolved_by: None,
        resolved_at: None,
    })
    .expect("valid alert draft")
}

#[tokio::test]
async fn resolve_alert_returns_the_resolved_payload() {
    let alert = unresolved_alert();
    let alert_id = alert.id();
    let resolver_id = Uuid::new_v4();
    let resolved = alert.resolve(resolver_id, Utc::now());

    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_resolve()
        .times(1)
        .withf(move |id, resolver, _| *id == alert_id && *resolver == resolver_id)
        .return_once(move |_, _, _| Ok(ResolveAlertOutcome::Resolved(resolved)));

    let payload = service(alerts)
        .resolve_alert(ResolveAlertRequest {
            alert_id,
            resolver_id,
        })
        .await
        .expect("resolution succeeds");

    assert_eq!(payload.id, alert_id);
    assert!(payload.resolved);
    assert_eq!(payload.resolved_by, Some(resolver_id));
    assert!(payload.resolved_at.is_some());
}

#[tokio::test]
async fn resolve_alert_already_resolved_is_a_conflict() {
    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_resolve()
        .times(1)
        .return_once(|_, _, _| Ok(ResolveAlertOutcome::AlreadyResolved));

    let error = service(alerts)
        .resolve_alert(ResolveAlertRequest {
            alert_id: Uuid::new_v4(),
            resolver_id: Uuid::new_v4(),
        })
        .await
        .expect_err("second resolution loses");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn resolve_alert_unknown_is_not_found() {
    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_resolve()
        .times(1)
        .return_once(|_, _, _| Ok(ResolveAlertOutcome::NotFound));

    let error = service(alerts)
        .resolve_alert(ResolveAlertRequest {
            alert_id: Uuid::new_v4(),
            resolver_id: Uuid::new_v4(),
        })
        .await
        .expect_err("unknown alert");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn resolve_alert_maps_connection_error_to_service_unavailable() {
    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_resolve()
        .times(1)
        .return_once(|_, _, _| Err(AlertRepositoryError::connection("pool unavailable")));

    let error = service(alerts)
        .resolve_alert(ResolveAlertRequest {
            alert_id: Uuid::new_v4(),
            resolver_id: Uuid::new_v4(),
        })
        .await
        .expect_err("repository unreachable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

#[tokio::test]
async fn list_alerts_forwards_the_filter() {
    let installation_id = Uuid::new_v4();
    let first = unresolved_alert();
    let second = unresolved_alert();
    let first_id = first.id();

    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_list()
        .times(1)
        .withf(move |filter| {
            filter.installation_id == Some(installation_id) && filter.unresolved_only
        })
        .return_once(move |_| Ok(vec![first, second]));

    let response = service(alerts)
        .list_alerts(ListAlertsRequest {
            installation_id: Some(installation_id),
            unresolved_only: true,
        })
        .await
        .expect("listing succeeds");

    assert_eq!(response.alerts.len(), 2);
    assert_eq!(response.alerts[0].id, first_id);
    assert_eq!(response.alerts[0].severity, AlertSeverity::Warning);
    assert!(!response.alerts[0].resolved);
}

#[tokio::test]
async fn list_alerts_defaults_to_everything() {
    let mut alerts = MockAlertRepository::new();
    alerts
        .expect_list()
        .times(1)
        .withf(|filter| filter.installation_id.is_none() && !filter.unresolved_only)
        .return_once(|_| Ok(Vec::new()));

    let response = service(alerts)
        .list_alerts(ListAlertsRequest::default())
        .await
        .expect("listing succeeds");

    assert!(response.alerts.is_empty());
}
