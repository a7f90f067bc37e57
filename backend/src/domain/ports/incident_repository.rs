//! Port for incident persistence.

use async_trait::async_trait;

use crate::domain::Incident;

use super::define_port_error;

define_port_error! {
    /// Errors raised by incident repository adapters.
    pub enum IncidentRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "incident repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "incident repository query failed: {message}",
    }
}

/// Port for recording incidents reported during executions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IncidentRepository: Send + Sync {
    /// Persist a reported incident.
    async fn insert(&self, incident: &Incident) -> Result<(), IncidentRepositoryError>;
}

/// Fixture implementation that accepts every incident.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIncidentRepository;

#[async_trait]
impl IncidentRepository for FixtureIncidentRepository {
    async fn insert(&self, _incident: &Incident) -> Result<(), IncidentRepositoryError> {
        Ok(())
    }
}
