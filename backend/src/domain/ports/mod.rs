//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod alert_command;
mod alert_query;
mod alert_repository;
mod checkpoint_repository;
mod execution_repository;
mod incident_repository;
mod mark_repository;
mod monitoring_query;
mod monitoring_repository;
mod patrol_command;
mod schedule_repository;
mod slot_generation_command;
mod template_repository;

#[cfg(test)]
pub use alert_command::MockAlertCommand;
pub use alert_command::{AlertCommand, AlertPayload, FixtureAlertCommand, ResolveAlertRequest};
#[cfg(test)]
pub use alert_query::MockAlertQuery;
pub use alert_query::{AlertQuery, FixtureAlertQuery, ListAlertsRequest, ListAlertsResponse};
#[cfg(test)]
pub use alert_repository::MockAlertRepository;
pub use alert_repository::{
    AlertFilter, AlertRepository, AlertRepositoryError, FixtureAlertRepository,
    ResolveAlertOutcome,
};
#[cfg(test)]
pub use checkpoint_repository::MockCheckpointRepository;
pub use checkpoint_repository::{
    CheckpointRepository, CheckpointRepositoryError, FixtureCheckpointRepository,
};
#[cfg(test)]
pub use execution_repository::MockExecutionRepository;
pub use execution_repository::{
    ExecutionCompletion, ExecutionRepository, ExecutionRepositoryError, ExecutionStart,
    FixtureExecutionRepository, InsertPendingOutcome,
};
#[cfg(test)]
pub use incident_repository::MockIncidentRepository;
pub use incident_repository::{
    FixtureIncidentRepository, IncidentRepository, IncidentRepositoryError,
};
#[cfg(test)]
pub use mark_repository::MockMarkRepository;
pub use mark_repository::{FixtureMarkRepository, MarkRepository, MarkRepositoryError};
#[cfg(test)]
pub use monitoring_query::MockMonitoringQuery;
pub use monitoring_query::{
    ActivePatrolPayload, FixtureMonitoringQuery, ListActiveExecutionsRequest,
    ListActiveExecutionsResponse, MonitoringQuery,
};
#[cfg(test)]
pub use monitoring_repository::MockMonitoringRepository;
pub use monitoring_repository::{
    ActivePatrol, FixtureMonitoringRepository, MonitoringRepository, MonitoringRepositoryError,
};
#[cfg(test)]
pub use patrol_command::MockPatrolCommand;
pub use patrol_command::{
    CompleteExecutionRequest, ExecutionPayload, FixturePatrolCommand, IncidentPayload,
    MarkCheckpointRequest, MarkPayload, PanicPayload, PatrolCommand, ReportIncidentRequest,
    StartExecutionRequest, TriggerPanicRequest,
};
#[cfg(test)]
pub use schedule_repository::MockRoundScheduleRepository;
pub use schedule_repository::{
    FixtureRoundScheduleRepository, RoundScheduleRepository, ScheduleRepositoryError,
};
#[cfg(test)]
pub use slot_generation_command::MockSlotGenerationCommand;
pub use slot_generation_command::{
    FixtureSlotGenerationCommand, GenerateForScheduleRequest, GenerationReport,
    RunGenerationPassRequest, SlotGenerationCommand,
};
#[cfg(test)]
pub use template_repository::MockRoundTemplateRepository;
pub use template_repository::{
    FixtureRoundTemplateRepository, RoundTemplateRepository, TemplateRepositoryError,
};
