//! Patrol round entities.
//!
//! Purpose: Validated domain types for templates, checkpoints, schedules,
//! executions, checkpoint marks, incidents, and alerts. Each entity is built
//! from a plain draft struct through `new`, which funnels into the `TryFrom`
//! implementations in [`validation`]; invalid drafts never become entities.

use std::fmt;

use uuid::Uuid;

mod alert;
mod checkpoint;
mod execution;
mod incident;
mod mark;
mod schedule;
mod template;
mod validation;

pub use alert::{Alert, AlertDraft, AlertKind, ParseAlertKindError};
pub use checkpoint::{Checkpoint, CheckpointDraft};
pub use execution::{
    DeviceInfo, ExecutionStatus, ParseExecutionStatusError, RoundExecution, RoundExecutionDraft,
};
pub use incident::{Incident, IncidentDraft, IncidentKind, PANIC_INCIDENT_KIND};
pub use mark::{CheckpointMark, CheckpointMarkDraft};
pub use schedule::{RoundSchedule, RoundScheduleDraft};
pub use template::{
    CheckpointOrdering, ParseCheckpointOrderingError, RoundTemplate, RoundTemplateDraft,
};

/// Validation failure raised while constructing a patrol entity.
#[derive(Debug, Clone, PartialEq)]
pub enum PatrolValidationError {
    /// A template name that is empty once trimmed.
    BlankTemplateName,
    /// The same checkpoint listed twice in a template.
    DuplicateCheckpoint {
        /// The repeated checkpoint identifier.
        checkpoint_id: Uuid,
    },
    /// A checkpoint scan code that is empty once trimmed.
    BlankScanCode,
    /// A geofence radius that is negative or not finite.
    InvalidRadius {
        /// Rejected radius in meters.
        value: f64,
    },
    /// A schedule frequency of zero minutes.
    ZeroFrequency,
    /// More completed checkpoints than the template defines.
    CompletedExceedsTotal {
        /// Claimed completed count.
        completed: u32,
        /// Template checkpoint count.
        total: u32,
    },
    /// A completion timestamp earlier than the start timestamp.
    CompletedBeforeStarted,
    /// A scan measurement that is negative or not finite.
    InvalidMeasurement {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
    /// A movement score outside `[0, 1]`.
    MovementScoreOutOfRange {
        /// Rejected score.
        value: f64,
    },
    /// A battery percentage outside `[0, 100]`.
    BatteryOutOfRange {
        /// Rejected percentage.
        value: i16,
    },
    /// An incident kind that is empty once trimmed.
    BlankIncidentKind,
    /// An alert message that is empty once trimmed.
    BlankAlertMessage,
    /// Resolution fields inconsistent with the resolved flag.
    ResolutionStateMismatch,
}

impl fmt::Display for PatrolValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BlankTemplateName => write!(f, "template name must not be blank"),
            Self::DuplicateCheckpoint { checkpoint_id } => {
                write!(f, "checkpoint {checkpoint_id} is listed more than once")
            }
            Self::BlankScanCode => write!(f, "checkpoint scan code must not be blank"),
            Self::InvalidRadius { value } => {
                write!(f, "radius {value} must be a finite non-negative number")
            }
            Self::ZeroFrequency => write!(f, "schedule frequency must be at least one minute"),
            Self::CompletedExceedsTotal { completed, total } => {
                write!(f, "completed count {completed} exceeds template total {total}")
            }
            Self::CompletedBeforeStarted => {
                write!(f, "completion timestamp precedes the start timestamp")
            }
            Self::InvalidMeasurement { field, value } => {
                write!(f, "{field} {value} must be a finite non-negative number")
            }
            Self::MovementScoreOutOfRange { value } => {
                write!(f, "movement score {value} is outside [0, 1]")
            }
            Self::BatteryOutOfRange { value } => {
                write!(f, "battery percentage {value} is outside [0, 100]")
            }
            Self::BlankIncidentKind => write!(f, "incident kind must not be blank"),
            Self::BlankAlertMessage => write!(f, "alert message must not be blank"),
            Self::ResolutionStateMismatch => {
                write!(f, "resolution fields do not match the resolved flag")
            }
        }
    }
}

impl std::error::Error for PatrolValidationError {}
