//! Driving port for the live monitoring read model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::Error;

use super::monitoring_repository::ActivePatrol;
use super::patrol_command::{ExecutionPayload, MarkPayload};

/// Serializable active patrol projection for driving ports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivePatrolPayload {
    pub execution: ExecutionPayload,
    pub template_name: String,
    pub latest_mark: Option<MarkPayload>,
}

impl From<ActivePatrol> for ActivePatrolPayload {
    fn from(value: ActivePatrol) -> Self {
        Self {
            execution: value.execution.into(),
            template_name: value.template_name,
            latest_mark: value.latest_mark.map(Into::into),
        }
    }
}

/// Request to list executions currently being walked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActiveExecutionsRequest {
    /// Restrict to one installation when set.
    pub installation_id: Option<Uuid>,
}

/// Response listing in-progress executions with display context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListActiveExecutionsResponse {
    pub patrols: Vec<ActivePatrolPayload>,
}

/// Driving port for monitoring read operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonitoringQuery: Send + Sync {
    /// Lists in-progress executions with template names and latest marks.
    async fn list_active_executions(
        &self,
        request: ListActiveExecutionsRequest,
    ) -> Result<ListActiveExecutionsResponse, Error>;
}

/// Fixture query implementation reporting no active patrols.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMonitoringQuery;

#[async_trait]
impl MonitoringQuery for FixtureMonitoringQuery {
    async fn list_active_executions(
        &self,
        _request: ListActiveExecutionsRequest,
    ) -> Result<ListActiveExecutionsResponse, Error> {
        Ok(ListActiveExecutionsResponse {
            patrols: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::Utc;
    use rstest::rstest;

    use crate::domain::{ExecutionStatus, RoundExecution, RoundExecutionDraft};

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_active_patrols() {
        let query = FixtureMonitoringQuery;
        let response = query
            .list_active_executions(ListActiveExecutionsRequest::default())
            .await
            .expect("fixture listing succeeds");
        assert!(response.patrols.is_empty());
    }

    #[rstest]
    fn payload_projects_template_name_and_mark() {
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
            checkpoints_completed: 1,
            trust_score: 0,
            started_at: Some(now),
            completed_at: None,
            device: None,
        })
        .expect("valid execution draft");

        let payload = ActivePatrolPayload::from(ActivePatrol {
            execution: execution.clone(),
            template_name: "Night perimeter".into(),
            latest_mark: None,
        });

        assert_eq!(payload.execution.id, execution.id());
        assert_eq!(payload.template_name, "Night perimeter");
        assert!(payload.latest_mark.is_none());
    }
}
