//! Domain primitives, aggregates, and services of the patrol engine.
//!
//! Purpose: define the strongly typed core the inbound and persistence
//! layers speak through. Types are immutable once constructed; invariants
//! and serialisation contracts (serde) live in each type's Rustdoc.
//!
//! Layout:
//! - Pure components: `geo`, `anomaly`, `trust`, `schedule`. No IO, no
//!   errors, degradation through `Option`.
//! - Entities: `patrol` holds validated drafts for templates, checkpoints,
//!   schedules, executions, marks, incidents and alerts.
//! - `ports` holds the driven and driving traits at the hexagon's edges.
//! - Services: implement the driving ports over the driven ones.

pub mod anomaly;
pub mod error;
pub mod geo;
pub mod patrol;
pub mod ports;
pub mod request_id;
pub mod schedule;
pub mod trust;

mod alert_service;
mod monitoring_service;
mod patrol_service;
mod slot_generation_service;

pub use self::alert_service::AlertService;
pub use self::anomaly::AnomalyCode;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::geo::{GeoPoint, GeoValidationError};
pub use self::monitoring_service::MonitoringService;
pub use self::patrol::{
    Alert, AlertDraft, AlertKind, Checkpoint, CheckpointDraft, CheckpointMark,
    CheckpointMarkDraft, CheckpointOrdering, DeviceInfo, ExecutionStatus, Incident, IncidentDraft,
    IncidentKind, PANIC_INCIDENT_KIND, ParseAlertKindError, ParseCheckpointOrderingError,
    ParseExecutionStatusError, PatrolValidationError, RoundExecution, RoundExecutionDraft,
    RoundSchedule, RoundScheduleDraft, RoundTemplate, RoundTemplateDraft,
};
pub use self::patrol_service::{PatrolService, PatrolServiceDeps};
pub use self::request_id::RequestId;
pub use self::schedule::{ScheduleValidationError, SlotWindow, WeekdaySet};
pub use self::slot_generation_service::SlotGenerationService;
pub use self::trust::{AlertSeverity, TrustBand};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("no such patrol"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
