//! Port for the live monitoring read model.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{CheckpointMark, RoundExecution};

use super::define_port_error;

define_port_error! {
    /// Errors raised by monitoring repository adapters.
    pub enum MonitoringRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "monitoring repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "monitoring repository query failed: {message}",
    }
}

/// One in-progress execution joined with its display context.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivePatrol {
    /// The in-progress execution.
    pub execution: RoundExecution,
    /// Name of the template the execution follows.
    pub template_name: String,
    /// Most recent mark of the execution, when any exists.
    pub latest_mark: Option<CheckpointMark>,
}

/// Port for reading executions that are currently being walked.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonitoringRepository: Send + Sync {
    /// List in-progress executions, optionally restricted to one
    /// installation.
    async fn list_active(
        &self,
        installation_id: Option<Uuid>,
    ) -> Result<Vec<ActivePatrol>, MonitoringRepositoryError>;
}

/// Fixture implementation reporting no active patrols.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMonitoringRepository;

#[async_trait]
impl MonitoringRepository for FixtureMonitoringRepository {
    async fn list_active(
        &self,
        _installation_id: Option<Uuid>,
    ) -> Result<Vec<ActivePatrol>, MonitoringRepositoryError> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_reports_no_active_patrols() {
        let repo = FixtureMonitoringRepository;
        let patrols = repo
            .list_active(None)
            .await
            .expect("fixture listing succeeds");
        assert!(patrols.is_empty());
        let scoped = repo
            .list_active(Some(Uuid::new_v4()))
            .await
            .expect("fixture listing succeeds");
        assert!(scoped.is_empty());
    }

    #[rstest]
    fn query_error_formats_message() {
        let err = MonitoringRepositoryError::query("join failed");
        assert_eq!(err.to_string(), "monitoring repository query failed: join failed");
    }
}
