//! Port for round template reads.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::RoundTemplate;

use super::define_port_error;

define_port_error! {
    /// Errors raised by round template repository adapters.
    pub enum TemplateRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "round template repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "round template repository query failed: {message}",
    }
}

/// Port for reading round templates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoundTemplateRepository: Send + Sync {
    /// Find a template by id.
    async fn find_by_id(
        &self,
        template_id: &Uuid,
    ) -> Result<Option<RoundTemplate>, TemplateRepositoryError>;
}

/// Fixture implementation for tests that do not exercise template reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureRoundTemplateRepository;

#[async_trait]
impl RoundTemplateRepository for FixtureRoundTemplateRepository {
    async fn find_by_id(
        &self,
        _template_id: &Uuid,
    ) -> Result<Option<RoundTemplate>, TemplateRepositoryError> {
        Ok(None)
    }
}
