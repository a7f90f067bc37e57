//! Port for checkpoint reads, including scan code resolution.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Checkpoint;

use super::define_port_error;

define_port_error! {
    /// Errors raised by checkpoint repository adapters.
    pub enum CheckpointRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "checkpoint repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "checkpoint repository query failed: {message}",
    }
}

/// Port for reading checkpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CheckpointRepository: Send + Sync {
    /// Find a checkpoint by id.
    async fn find_by_id(
        &self,
        checkpoint_id: &Uuid,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError>;

    /// Resolve an active checkpoint by scan code within an installation.
    ///
    /// Inactive checkpoints are not scannable and resolve to `None`.
    async fn find_by_scan_code(
        &self,
        installation_id: &Uuid,
        scan_code: &str,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError>;
}

/// Fixture implementation for tests that do not exercise checkpoint reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCheckpointRepository;

#[async_trait]
impl CheckpointRepository for FixtureCheckpointRepository {
    async fn find_by_id(
        &self,
        _checkpoint_id: &Uuid,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
        Ok(None)
    }

    async fn find_by_scan_code(
        &self,
        _installation_id: &Uuid,
        _scan_code: &str,
    ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use rstest::rstest;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_scan_code_lookup_returns_none() {
        let repo = FixtureCheckpointRepository;
        let found = repo
            .find_by_scan_code(&Uuid::new_v4(), "CP-01")
            .await
            .expect("fixture lookup succeeds");
        assert!(found.is_none());
    }

    #[rstest]
    fn query_error_formats_message() {
        let err = CheckpointRepositoryError::query("bad filter");
        assert!(err.to_string().contains("bad filter"));
    }
}
