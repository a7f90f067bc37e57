//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AlertCommand, AlertQuery, FixtureAlertCommand, FixtureAlertQuery, FixtureMonitoringQuery,
    FixturePatrolCommand, FixtureSlotGenerationCommand, MonitoringQuery, PatrolCommand,
    SlotGenerationCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub patrol: Arc<dyn PatrolCommand>,
    pub slot_generation: Arc<dyn SlotGenerationCommand>,
    pub alert_commands: Arc<dyn AlertCommand>,
    pub alert_queries: Arc<dyn AlertQuery>,
    pub monitoring: Arc<dyn MonitoringQuery>,
}

impl Default for HttpStatePorts {
    fn default() -> Self {
        Self {
            patrol: Arc::new(FixturePatrolCommand),
            slot_generation: Arc::new(FixtureSlotGenerationCommand),
            alert_commands: Arc::new(FixtureAlertCommand),
            alert_queries: Arc::new(FixtureAlertQuery),
            monitoring: Arc::new(FixtureMonitoringQuery),
        }
    }
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub patrol: Arc<dyn PatrolCommand>,
    pub slot_generation: Arc<dyn SlotGenerationCommand>,
    pub alert_commands: Arc<dyn AlertCommand>,
    pub alert_queries: Arc<dyn AlertQuery>,
    pub monitoring: Arc<dyn MonitoringQuery>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use backend::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let state = HttpState::new(HttpStatePorts::default());
    /// let _patrol = state.patrol.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            patrol,
            slot_generation,
            alert_commands,
            alert_queries,
            monitoring,
        } = ports;
        Self {
            patrol,
            slot_generation,
            alert_commands,
            alert_queries,
            monitoring,
        }
    }
}
