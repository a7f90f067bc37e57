//! Port for alert persistence, resolution, and listing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Alert;

use super::define_port_error;

define_port_error! {
    /// Errors raised by alert repository adapters.
    pub enum AlertRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "alert repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "alert repository query failed: {message}",
    }
}

/// Result of attempting to resolve an alert.
///
/// Resolution is compare-and-set on the unresolved state, so a second
/// resolver observes [`ResolveAlertOutcome::AlreadyResolved`] rather than
/// overwriting the first.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveAlertOutcome {
    /// The alert transitioned to resolved; the updated row is returned.
    Resolved(Alert),
    /// The alert was already resolved by an earlier call.
    AlreadyResolved,
    /// No alert exists with the given id.
    NotFound,
}

/// Listing filter for alerts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AlertFilter {
    /// Restrict to one installation when set.
    pub installation_id: Option<Uuid>,
    /// Drop resolved alerts from the listing.
    pub unresolved_only: bool,
}

/// Port for writing and reading alerts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AlertRepository: Send + Sync {
    /// Persist a raised alert.
    async fn insert(&self, alert: &Alert) -> Result<(), AlertRepositoryError>;

    /// Find an alert by id.
    async fn find_by_id(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertRepositoryError>;

    /// Resolve an alert if it is still unresolved.
    async fn resolve(
        &self,
        alert_id: &Uuid,
        resolver_id: &Uuid,
        resolved_at: DateTime<Utc>,
    ) -> Result<ResolveAlertOutcome, AlertRepositoryError>;

    /// List alerts matching the filter, unresolved first, newest first within
    /// each group.
    async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertRepositoryError>;
}

/// Fixture implementation reporting no alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAlertRepository;

#[async_trait]
impl AlertRepository for FixtureAlertRepository {
    async fn insert(&self, _alert: &Alert) -> Result<(), AlertRepositoryError> {
        Ok(())
    }

    async fn find_by_id(&self, _alert_id: &Uuid) -> Result<Option<Alert>, AlertRepositoryError> {
        Ok(None)
    }

    async fn resolve(
        &self,
        _alert_id: &Uuid,
        _resolver_id: &Uuid,
        _resolved_at: DateTime<Utc>,
    ) -> Result<ResolveAlertOutcome, AlertRepositoryError> {
        Ok(ResolveAlertOutcome::NotFound)
    }

    async fn list(&self, _filter: &AlertFilter) -> Result<Vec<Alert>, AlertRepositoryError> {
        Ok(Vec::new())
    }
}
