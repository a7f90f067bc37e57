//! End-to-end patrol round flow over the in-memory repositories.
//!
//! Exercises slot generation, execution start, checkpoint marking, panic
//! handling, and completion through the real domain services, asserting the
//! read models the HTTP layer serves.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use backend::domain::ports::{
    AlertCommand, AlertQuery, CompleteExecutionRequest, ExecutionPayload,
    GenerateForScheduleRequest, ListActiveExecutionsRequest, ListAlertsRequest,
    MarkCheckpointRequest, MonitoringQuery, PatrolCommand, ResolveAlertRequest,
    SlotGenerationCommand, StartExecutionRequest, TriggerPanicRequest,
};
use backend::domain::{
    AlertKind, AlertService, AlertSeverity, AnomalyCode, Checkpoint, CheckpointDraft,
    CheckpointOrdering, DeviceInfo, ErrorCode, ExecutionStatus, GeoPoint, MonitoringService,
    PatrolService, PatrolServiceDeps, RoundSchedule, RoundScheduleDraft, RoundTemplate,
    RoundTemplateDraft, SlotGenerationService, SlotWindow, TrustBand, WeekdaySet,
};
use backend::test_support::memory::InMemoryPatrolRepository;
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use mockable::{Clock, MockClock};
use uuid::Uuid;

const LOOKAHEAD_HOURS: u32 = 24;

type MemoryGeneration = SlotGenerationService<
    InMemoryPatrolRepository,
    InMemoryPatrolRepository,
    InMemoryPatrolRepository,
>;

/// Clock advancing by `step` on every reading.
///
/// Keeps computed walking speeds realistic without sleeping in the test.
fn scripted_clock(base: DateTime<Utc>, step: Duration) -> Arc<dyn Clock> {
    let mut clock = MockClock::new();
    let ticks = AtomicI64::new(0);
    clock.expect_utc().returning(move || {
        let tick = ticks.fetch_add(1, Ordering::SeqCst);
        base + step * i32::try_from(tick).expect("tick fits in i32")
    });
    Arc::new(clock)
}

struct Flow {
    store: InMemoryPatrolRepository,
    installation_id: Uuid,
    template_id: Uuid,
    schedule_id: Uuid,
    patrol: PatrolService,
    generation: MemoryGeneration,
}

fn checkpoint(installation_id: Uuid, scan_code: &str, lat: f64, lng: f64) -> Checkpoint {
    Checkpoint::new(CheckpointDraft {
        id: Uuid::new_v4(),
        installation_id,
        scan_code: scan_code.to_owned(),
        position: Some(GeoPoint::new(lat, lng).expect("valid position")),
        radius_m: 30.0,
        active: true,
    })
    .expect("valid checkpoint")
}

/// Seed one installation with a three-checkpoint template and a Monday
/// schedule running 22:00-23:00 every 30 minutes.
fn seeded_flow(clock: Arc<dyn Clock>) -> Flow {
    let store = InMemoryPatrolRepository::new();
    let installation_id = Uuid::new_v4();

    let checkpoints = [
        checkpoint(installation_id, "CP-01", -33.4500, -70.6600),
        checkpoint(installation_id, "CP-02", -33.4502, -70.6602),
        checkpoint(installation_id, "CP-03", -33.4504, -70.6604),
    ];
    let checkpoint_ids: Vec<Uuid> = checkpoints.iter().map(|checkpoint| checkpoint.id()).collect();
    for checkpoint in checkpoints {
        store.put_checkpoint(checkpoint);
    }

    let template = RoundTemplate::new(RoundTemplateDraft {
        id: Uuid::new_v4(),
        installation_id,
        name: "Night perimeter".to_owned(),
        ordering: CheckpointOrdering::Flexible,
        checkpoint_ids,
        active: true,
    })
    .expect("valid template");
    let template_id = template.id();
    store.put_template(template);

    let schedule = RoundSchedule::new(RoundScheduleDraft {
        id: Uuid::new_v4(),
        template_id,
        weekdays: WeekdaySet::new([1]).expect("valid weekdays"),
        start_time: NaiveTime::from_hms_opt(22, 0, 0).expect("valid time"),
        end_time: NaiveTime::from_hms_opt(23, 0, 0).expect("valid time"),
        frequency_minutes: 30,
        tolerance_minutes: 10,
        active: true,
    })
    .expect("valid schedule");
    let schedule_id = schedule.id();
    store.put_schedule(schedule);

    let patrol = PatrolService::new(PatrolServiceDeps {
        executions: Arc::new(store.clone()),
        checkpoints: Arc::new(store.clone()),
        templates: Arc::new(store.clone()),
        marks: Arc::new(store.clone()),
        incidents: Arc::new(store.clone()),
        alerts: Arc::new(store.clone()),
        clock: clock.clone(),
    });
    let generation = SlotGenerationService::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        clock,
        LOOKAHEAD_HOURS,
    );

    Flow {
        store,
        installation_id,
        template_id,
        schedule_id,
        patrol,
        generation,
    }
}

/// 2026-03-02 is a Monday; the window covers that whole day in UTC.
fn monday_window() -> SlotWindow {
    let from = Utc
        .with_ymd_and_hms(2026, 3, 2, 0, 0, 0)
        .single()
        .expect("valid window start");
    let to = Utc
        .with_ymd_and_hms(2026, 3, 3, 0, 0, 0)
        .single()
        .expect("valid window end");
    SlotWindow::new(from, to).expect("valid window")
}

fn flow_base() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 22, 5, 0)
        .single()
        .expect("valid base instant")
}

/// Generate the Monday slots and start the earliest pending execution.
async fn generate_and_start(flow: &Flow, guard_id: Uuid) -> ExecutionPayload {
    flow.generation
        .generate_for_schedule(GenerateForScheduleRequest {
            schedule_id: flow.schedule_id,
            window: Some(monday_window()),
        })
        .await
        .expect("generation succeeds");
    let first = flow
        .store
        .executions()
        .into_iter()
        .min_by_key(|execution| execution.scheduled_at())
        .expect("pending execution");
    flow.patrol
        .start_execution(StartExecutionRequest {
            execution_id: first.id(),
            guard_id,
            device: None,
        })
        .await
        .expect("start succeeds")
}

#[tokio::test]
async fn full_round_completes_with_green_trust() {
    let flow = seeded_flow(scripted_clock(flow_base(), Duration::minutes(5)));

    let request = GenerateForScheduleRequest {
        schedule_id: flow.schedule_id,
        window: Some(monday_window()),
    };
    let report = flow
        .generation
        .generate_for_schedule(request)
        .await
        .expect("generation succeeds");
    assert_eq!(report.template_id, flow.template_id);
    assert_eq!(report.slots, 3);
    assert_eq!(report.created, 3);
    assert_eq!(report.already_scheduled, 0);

    // Re-running the same window must not duplicate executions.
    let rerun = flow
        .generation
        .generate_for_schedule(request)
        .await
        .expect("second generation succeeds");
    assert_eq!(rerun.created, 0);
    assert_eq!(rerun.already_scheduled, 3);

    let first = flow
        .store
        .executions()
        .into_iter()
        .min_by_key(|execution| execution.scheduled_at())
        .expect("pending execution");
    assert_eq!(first.status(), ExecutionStatus::Pending);
    assert_eq!(
        first.scheduled_at(),
        Utc.with_ymd_and_hms(2026, 3, 2, 22, 0, 0)
            .single()
            .expect("valid slot")
    );

    let guard_id = Uuid::new_v4();
    let started = flow
        .patrol
        .start_execution(StartExecutionRequest {
            execution_id: first.id(),
            guard_id,
            device: Some(DeviceInfo {
                fingerprint: Some("dev-1".to_owned()),
                ..DeviceInfo::default()
            }),
        })
        .await
        .expect("start succeeds");
    assert_eq!(started.status, ExecutionStatus::InProgress);
    assert_eq!(started.guard_id, Some(guard_id));
    assert!(started.started_at.is_some());

    let mark_request = |scan_code: &str, lat: f64, lng: f64, battery: i16, photo: Option<&str>| {
        MarkCheckpointRequest {
            execution_id: first.id(),
            scan_code: scan_code.to_owned(),
            position: Some(GeoPoint::new(lat, lng).expect("valid position")),
            battery_pct: Some(battery),
            movement_score: Some(0.6),
            photo_url: photo.map(str::to_owned),
            device_fingerprint: Some("dev-1".to_owned()),
        }
    };

    // First mark: no previous mark, so speed is unknown and the device
    // continuity credit cannot apply yet.
    let mark1 = flow
        .patrol
        .mark_checkpoint(mark_request("CP-01", -33.4500, -70.6600, 90, None))
        .await
        .expect("first mark succeeds");
    assert!(mark1.geo_valid);
    assert!(mark1.distance_m.expect("distance computed") < 0.5);
    assert!(mark1.anomalies.is_empty());
    assert_eq!(mark1.speed_from_prev_kmh, None);
    assert_eq!(mark1.trust_score, 75);

    // Second mark adds a photo and the device continuity credit; five
    // scripted minutes over ~29 m keeps the speed at walking pace.
    let mark2 = flow
        .patrol
        .mark_checkpoint(mark_request(
            "CP-02",
            -33.4502,
            -70.6602,
            85,
            Some("https://cdn.example.net/scans/cp-02.jpg"),
        ))
        .await
        .expect("second mark succeeds");
    let speed = mark2.speed_from_prev_kmh.expect("speed computed");
    assert!(speed < 1.0, "walking pace expected, got {speed} km/h");
    assert!(mark2.anomalies.is_empty());
    assert!(mark2.marked_at > mark1.marked_at);
    assert_eq!(mark2.trust_score, 100);

    // The dashboard sees the round while it is still in progress.
    let monitoring = MonitoringService::new(Arc::new(flow.store.clone()));
    let active = monitoring
        .list_active_executions(ListActiveExecutionsRequest {
            installation_id: Some(flow.installation_id),
        })
        .await
        .expect("monitoring succeeds");
    assert_eq!(active.patrols.len(), 1);
    assert_eq!(active.patrols[0].template_name, "Night perimeter");
    assert_eq!(active.patrols[0].execution.id, first.id());
    let latest = active.patrols[0]
        .latest_mark
        .as_ref()
        .expect("latest mark present");
    assert_eq!(latest.id, mark2.id);

    let mark3 = flow
        .patrol
        .mark_checkpoint(mark_request("CP-03", -33.4504, -70.6604, 80, None))
        .await
        .expect("third mark succeeds");
    assert_eq!(mark3.trust_score, 85);

    // Round trust is the half-up rounded mean of 75, 100, and 85.
    let completed = flow
        .patrol
        .complete_execution(CompleteExecutionRequest {
            execution_id: first.id(),
        })
        .await
        .expect("completion succeeds");
    assert_eq!(completed.status, ExecutionStatus::Completed);
    assert_eq!(completed.checkpoints_total, 3);
    assert_eq!(completed.checkpoints_completed, 3);
    assert_eq!(completed.completion_pct, 100);
    assert_eq!(completed.trust_score, 87);
    assert_eq!(completed.trust_band, TrustBand::Green);
    assert!(completed.completed_at.is_some());

    // A clean round raises no alerts and leaves nothing in progress.
    assert!(flow.store.alerts().is_empty());
    let after = monitoring
        .list_active_executions(ListActiveExecutionsRequest {
            installation_id: Some(flow.installation_id),
        })
        .await
        .expect("monitoring succeeds");
    assert!(after.patrols.is_empty());
}

#[tokio::test]
async fn panic_raises_critical_alert_and_resolution_is_final() {
    let clock = scripted_clock(flow_base(), Duration::minutes(5));
    let flow = seeded_flow(clock.clone());
    let guard_id = Uuid::new_v4();
    let started = generate_and_start(&flow, guard_id).await;

    let panic = flow
        .patrol
        .trigger_panic(TriggerPanicRequest {
            execution_id: started.id,
            position: Some(GeoPoint::new(-33.4501, -70.6601).expect("valid position")),
            note: Some("suspicious vehicle at gate".to_owned()),
        })
        .await
        .expect("panic succeeds");
    assert_eq!(panic.alert.kind, AlertKind::Panic);
    assert_eq!(panic.alert.severity, AlertSeverity::Critical);
    assert!(!panic.alert.resolved);
    assert_eq!(panic.incident.kind, "panic");
    assert_eq!(panic.incident.description, "suspicious vehicle at gate");
    assert_eq!(flow.store.incidents().len(), 1);

    let alert_service = AlertService::new(Arc::new(flow.store.clone()), clock);
    let listed = alert_service
        .list_alerts(ListAlertsRequest {
            installation_id: Some(flow.installation_id),
            unresolved_only: true,
        })
        .await
        .expect("listing succeeds");
    assert_eq!(listed.alerts.len(), 1);
    assert_eq!(listed.alerts[0].id, panic.alert.id);

    let resolver_id = Uuid::new_v4();
    let resolved = alert_service
        .resolve_alert(ResolveAlertRequest {
            alert_id: panic.alert.id,
            resolver_id,
        })
        .await
        .expect("resolution succeeds");
    assert!(resolved.resolved);
    assert_eq!(resolved.resolved_by, Some(resolver_id));
    assert!(resolved.resolved_at.is_some());

    let err = alert_service
        .resolve_alert(ResolveAlertRequest {
            alert_id: panic.alert.id,
            resolver_id,
        })
        .await
        .expect_err("second resolution rejected");
    assert_eq!(err.code(), ErrorCode::Conflict);

    let remaining = alert_service
        .list_alerts(ListAlertsRequest {
            installation_id: Some(flow.installation_id),
            unresolved_only: true,
        })
        .await
        .expect("listing succeeds");
    assert!(remaining.alerts.is_empty());
}

#[tokio::test]
async fn out_of_range_scan_raises_anomaly_alert() {
    let flow = seeded_flow(scripted_clock(flow_base(), Duration::minutes(5)));
    let started = generate_and_start(&flow, Uuid::new_v4()).await;

    // Roughly 220 m north of CP-01, far outside its 30 m radius.
    let mark = flow
        .patrol
        .mark_checkpoint(MarkCheckpointRequest {
            execution_id: started.id,
            scan_code: "CP-01".to_owned(),
            position: Some(GeoPoint::new(-33.4480, -70.6600).expect("valid position")),
            battery_pct: Some(90),
            movement_score: Some(0.6),
            photo_url: None,
            device_fingerprint: None,
        })
        .await
        .expect("mark recorded");
    assert!(!mark.geo_valid);
    assert!(mark.anomalies.contains(&AnomalyCode::GeoOutOfRange));
    assert_eq!(mark.trust_score, 45);

    let alerts = flow.store.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].kind(), AlertKind::Anomaly);
    assert_eq!(alerts[0].severity(), AlertSeverity::Critical);
    assert_eq!(alerts[0].execution_id(), Some(started.id));
}
