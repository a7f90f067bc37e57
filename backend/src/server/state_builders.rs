//! Builders for HTTP state ports backed by repositories or fixtures.

use std::sync::Arc;

use actix_web::web;
use mockable::{Clock, DefaultClock};

use backend::domain::{
    AlertService, MonitoringService, PatrolService, PatrolServiceDeps, SlotGenerationService,
};
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::persistence::{
    DbPool, DieselAlertRepository, DieselCheckpointRepository, DieselExecutionRepository,
    DieselIncidentRepository, DieselMarkRepository, DieselMonitoringRepository,
    DieselRoundScheduleRepository, DieselRoundTemplateRepository,
};

use super::ServerConfig;

/// Wire every port to its Diesel adapter over the shared pool.
fn build_pool_backed_ports(pool: &DbPool, lookahead_hours: u32) -> HttpStatePorts {
    let executions = Arc::new(DieselExecutionRepository::new(pool.clone()));
    let checkpoints = Arc::new(DieselCheckpointRepository::new(pool.clone()));
    let templates = Arc::new(DieselRoundTemplateRepository::new(pool.clone()));
    let schedules = Arc::new(DieselRoundScheduleRepository::new(pool.clone()));
    let marks = Arc::new(DieselMarkRepository::new(pool.clone()));
    let incidents = Arc::new(DieselIncidentRepository::new(pool.clone()));
    let alerts = Arc::new(DieselAlertRepository::new(pool.clone()));
    let monitoring = Arc::new(DieselMonitoringRepository::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let patrol = PatrolService::new(PatrolServiceDeps {
        executions: executions.clone(),
        checkpoints,
        templates: templates.clone(),
        marks,
        incidents,
        alerts: alerts.clone(),
        clock: clock.clone(),
    });
    let slot_generation = SlotGenerationService::new(
        schedules,
        templates,
        executions,
        clock.clone(),
        lookahead_hours,
    );
    let alert_service = Arc::new(AlertService::new(alerts, clock));

    HttpStatePorts {
        patrol: Arc::new(patrol),
        slot_generation: Arc::new(slot_generation),
        alert_commands: alert_service.clone(),
        alert_queries: alert_service,
        monitoring: Arc::new(MonitoringService::new(monitoring)),
    }
}

/// Build the shared HTTP state from configured ports and fixture fallbacks.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => build_pool_backed_ports(pool, config.lookahead_hours),
        None => HttpStatePorts::default(),
    };

    web::Data::new(HttpState::new(ports))
}

#[cfg(test)]
mod tests {
    use backend::domain::ErrorCode;
    use backend::domain::ports::{
        ListActiveExecutionsRequest, ListAlertsRequest, RunGenerationPassRequest,
    };
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    fn fixture_config() -> ServerConfig {
        let bind_addr = "127.0.0.1:0".parse().expect("loopback address parses");
        ServerConfig::new(bind_addr, 24)
    }

    #[rstest]
    #[tokio::test]
    async fn db_pool_absent_selects_fixture_ports() {
        let state = build_http_state(&fixture_config());

        let patrols = state
            .monitoring
            .list_active_executions(ListActiveExecutionsRequest::default())
            .await
            .expect("fixture monitoring succeeds");
        assert!(patrols.patrols.is_empty());

        let reports = state
            .slot_generation
            .run_generation_pass(RunGenerationPassRequest { window: None })
            .await
            .expect("fixture generation pass succeeds");
        assert!(reports.is_empty());

        let alerts = state
            .alert_queries
            .list_alerts(ListAlertsRequest::default())
            .await
            .expect("fixture alert listing succeeds");
        assert!(alerts.alerts.is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_start_execution_round_trips_ids() {
        let state = build_http_state(&fixture_config());
        let execution_id = Uuid::new_v4();

        let started = state
            .patrol
            .start_execution(backend::domain::ports::StartExecutionRequest {
                execution_id,
                guard_id: Uuid::new_v4(),
                device: None,
            })
            .await
            .expect("fixture start succeeds");

        assert_eq!(started.id, execution_id);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_generation_for_unknown_schedule_is_not_found() {
        let state = build_http_state(&fixture_config());

        let err = state
            .slot_generation
            .generate_for_schedule(backend::domain::ports::GenerateForScheduleRequest {
                schedule_id: Uuid::new_v4(),
                window: None,
            })
            .await
            .expect_err("fixture reports unknown schedule");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
