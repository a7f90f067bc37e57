//! Tests for the monitoring service.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::*;
use crate::domain::ports::{ActivePatrol, MockMonitoringRepository};
use crate::domain::{
    CheckpointMark, CheckpointMarkDraft, ErrorCode, ExecutionStatus, RoundExecution,
    RoundExecutionDraft,
};

fn active_patrol() -> ActivePatrol {
    let now = Utc::now();
    let execution = RoundExecution::new(RoundExecutionDraft {
        id: Uuid::new_v4(),
        template_id: Uuid::new_v4(),
        schedule_id: Uuid::new_v4(),
        installation_id: Uuid::new_v4(),
        scheduled_at: now,
        guard_id: Some(Uuid::new_v4()),
        status: ExecutionStatus::InProgress,
        checkpoints_total: 4,
        checkpoints_completed: 0,
        trust_score: 0,
        started_at: Some(now - Duration::minutes(10)),
        completed_at: None,
        device: None,
    })
    .expect("valid execution draft");
    let latest_mark = CheckpointMark::new(CheckpointMarkDraft {
        id: Uuid::new_v4(),
        execution_id: execution.id(),
        checkpoint_id: Uuid::new_v4(),
        marked_at: now - Duration::minutes(2),
        position: None,
        distance_m: None,
        geo_valid: true,
        speed_from_prev_kmh: None,
        movement_score: None,
        battery_pct: Some(64),
        device_fingerprint: None,
        photo_url: None,
        anomalies: BTreeSet::new(),
        trust_score: 70,
    })
    .expect("valid mark draft");
    ActivePatrol {
        execution,
        template_name: "Night perimeter".to_owned(),
        latest_mark: Some(latest_mark),
    }
}

#[tokio::test]
async fn list_active_executions_projects_repository_rows() {
    let patrol = active_patrol();
    let execution_id = patrol.execution.id();

    let mut monitoring = MockMonitoringRepository::new();
    monitoring
        .expect_list_active()
        .times(1)
        .withf(|installation_id| installation_id.is_none())
        .return_once(move |_| Ok(vec![patrol]));

    let response = MonitoringService::new(Arc::new(monitoring))
        .list_active_executions(ListActiveExecutionsRequest::default())
        .await
        .expect("listing succeeds");

    assert_eq!(response.patrols.len(), 1);
    let projected = &response.patrols[0];
    assert_eq!(projected.execution.id, execution_id);
    assert_eq!(projected.execution.status, ExecutionStatus::InProgress);
    assert_eq!(projected.template_name, "Night perimeter");
    let mark = projected.latest_mark.as_ref().expect("latest mark kept");
    assert_eq!(mark.trust_score, 70);
}

#[tokio::test]
async fn list_active_executions_scopes_to_installation() {
    let installation_id = Uuid::new_v4();

    let mut monitoring = MockMonitoringRepository::new();
    monitoring
        .expect_list_active()
        .times(1)
        .withf(move |filter| *filter == Some(installation_id))
        .return_once(|_| Ok(Vec::new()));

    let response = MonitoringService::new(Arc::new(monitoring))
        .list_active_executions(ListActiveExecutionsRequest {
            installation_id: Some(installation_id),
        })
        .await
        .expect("listing succeeds");

    assert!(response.patrols.is_empty());
}

#[tokio::test]
async fn list_active_executions_maps_connection_error_to_service_unavailable() {
    let mut monitoring = MockMonitoringRepository::new();
    monitoring
        .expect_list_active()
        .times(1)
        .return_once(|_| Err(MonitoringRepositoryError::connection("pool unavailable")));

    let error = MonitoringService::new(Arc::new(monitoring))
        .list_active_executions(ListActiveExecutionsRequest::default())
        .await
        .expect_err("repository unreachable");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
