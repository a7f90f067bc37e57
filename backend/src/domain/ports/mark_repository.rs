//! Port for checkpoint mark persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::CheckpointMark;

use super::define_port_error;

define_port_error! {
    /// Errors raised by checkpoint mark repository adapters.
    pub enum MarkRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "checkpoint mark repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "checkpoint mark repository query failed: {message}",
    }
}

/// Port for appending and reading checkpoint marks.
///
/// Marks are append-only; corrections happen as new marks, never as edits.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarkRepository: Send + Sync {
    /// Append a mark to its execution's trail.
    async fn append(&self, mark: &CheckpointMark) -> Result<(), MarkRepositoryError>;

    /// Fetch the most recent mark of an execution, by marked-at time.
    async fn latest_for_execution(
        &self,
        execution_id: &Uuid,
    ) -> Result<Option<CheckpointMark>, MarkRepositoryError>;

    /// List every mark of an execution in ascending marked-at order.
    async fn list_for_execution(
        &self,
        execution_id: &Uuid,
    ) -> Result<Vec<CheckpointMark>, MarkRepositoryError>;
}

/// Fixture implementation reporting an empty trail.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureMarkRepository;

#[async_trait]
impl MarkRepository for FixtureMarkRepository {
    async fn append(&self, _mark: &CheckpointMark) -> Result<(), MarkRepositoryError> {
        Ok(())
    }

    async fn latest_for_execution(
        &self,
        _execution_id: &Uuid,
    ) -> Result<Option<CheckpointMark>, MarkRepositoryError> {
        Ok(None)
    }

    async fn list_for_execution(
        &self,
        _execution_id: &Uuid,
    ) -> Result<Vec<CheckpointMark>, MarkRepositoryError> {
        Ok(Vec::new())
    }
}
