//! Port for round schedule reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::RoundSchedule;

use super::define_port_error;

define_port_error! {
    /// Errors raised by round schedule repository adapters.
    pub enum ScheduleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "round schedule repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "round schedule repository query failed: {message}",
    }
}

/// Port for reading round schedules.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundScheduleRepository: Send + Sync {
    /// Find a schedule by id.
    async fn find_by_id(
        &self,
        schedule_id: &Uuid,
    ) -> Result<Option<RoundSchedule>, ScheduleRepositoryError>;

    /// List every active schedule for a generation pass.
    async fn list_active(&self) -> Result<Vec<RoundSchedule>, ScheduleRepositoryError>;
}

/// Fixture implementation for tests that do not exercise schedule reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoundScheduleRepository;

#[async_trait]
impl RoundScheduleRepository for FixtureRoundScheduleRepository {
    async fn find_by_id(
        &self,
        _schedule_id: &Uuid,
    ) -> Result<Option<RoundSchedule>, ScheduleRepositoryError> {
        Ok(None)
    }

    async fn list_active(&self) -> Result<Vec<RoundSchedule>, ScheduleRepositoryError> {
        Ok(Vec::new())
    }
}
