//! Round execution entity and its lifecycle states.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PatrolValidationError;

/// Lifecycle state of a round execution.
///
/// `pending`, `in_progress`, and `incomplete` accept further activity; the
/// other states are terminal. `not_performed` is assigned outside this
/// engine when a pending slot's window elapses unvisited, but must round
/// trip through storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    /// Generated slot waiting for a guard.
    Pending,
    /// A guard has started the round.
    InProgress,
    /// Every template checkpoint was marked.
    Completed,
    /// Closed with checkpoints missing; may be resumed and closed again.
    Incomplete,
    /// The slot elapsed with no activity.
    NotPerformed,
}

impl ExecutionStatus {
    /// Stable wire and storage label for the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Incomplete => "incomplete",
            Self::NotPerformed => "not_performed",
        }
    }

    /// Whether start, mark, and complete operations remain permitted.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::InProgress | Self::Incomplete)
    }

    /// Whether the execution has reached a final state.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !self.is_active()
    }
}

impl fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown status label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseExecutionStatusError {
    value: String,
}

impl fmt::Display for ParseExecutionStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown execution status: {}", self.value)
    }
}

impl std::error::Error for ParseExecutionStatusError {}

impl FromStr for ExecutionStatus {
    type Err = ParseExecutionStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "incomplete" => Ok(Self::Incomplete),
            "not_performed" => Ok(Self::NotPerformed),
            other => Err(ParseExecutionStatusError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Device metadata captured when a guard starts a round.
///
/// Every field is optional; mobile clients report what they can.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    /// Opaque device fingerprint used for continuity checks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
    /// Hardware model name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Operating system version string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    /// Reporting application version.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Battery percentage at start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_pct: Option<i16>,
}

/// Input payload for [`RoundExecution::new`].
#[derive(Debug, Clone)]
pub struct RoundExecutionDraft {
    pub id: Uuid,
    pub template_id: Uuid,
    pub schedule_id: Uuid,
    pub installation_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub guard_id: Option<Uuid>,
    pub status: ExecutionStatus,
    pub checkpoints_total: u32,
    pub checkpoints_completed: u32,
    pub trust_score: u8,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub device: Option<DeviceInfo>,
}

/// One concrete occurrence of a patrol round.
///
/// # Examples
///
/// ```rust,ignore
/// # let draft = sample_round_execution_draft();
/// let execution = backend::domain::RoundExecution::new(draft)?;
/// assert!(execution.status().is_active());
/// # Ok::<(), backend::domain::PatrolValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoundExecution {
    pub(super) id: Uuid,
    pub(super) template_id: Uuid,
    pub(super) schedule_id: Uuid,
    pub(super) installation_id: Uuid,
    pub(super) scheduled_at: DateTime<Utc>,
    pub(super) guard_id: Option<Uuid>,
    pub(super) status: ExecutionStatus,
    pub(super) checkpoints_total: u32,
    pub(super) checkpoints_completed: u32,
    pub(super) trust_score: u8,
    pub(super) started_at: Option<DateTime<Utc>>,
    pub(super) completed_at: Option<DateTime<Utc>>,
    pub(super) device: Option<DeviceInfo>,
}

impl RoundExecution {
    /// Creates a validated round execution.
    pub fn new(draft: RoundExecutionDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the execution id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the template this execution instantiates.
    pub fn template_id(&self) -> Uuid {
        self.template_id
    }

    /// Returns the schedule that produced this execution.
    pub fn schedule_id(&self) -> Uuid {
        self.schedule_id
    }

    /// Returns the installation being patrolled.
    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    /// Returns the slot instant this execution covers.
    pub fn scheduled_at(&self) -> DateTime<Utc> {
        self.scheduled_at
    }

    /// Returns the assigned guard, once one has started the round.
    pub fn guard_id(&self) -> Option<Uuid> {
        self.guard_id
    }

    /// Returns the lifecycle state.
    pub fn status(&self) -> ExecutionStatus {
        self.status
    }

    /// Returns the checkpoint count captured from the template.
    pub fn checkpoints_total(&self) -> u32 {
        self.checkpoints_total
    }

    /// Returns the count of distinct template checkpoints marked so far.
    pub fn checkpoints_completed(&self) -> u32 {
        self.checkpoints_completed
    }

    /// Returns the completion percentage, rounded half-up.
    ///
    /// A round with no checkpoints reports `0` rather than dividing by zero.
    pub fn completion_pct(&self) -> u8 {
        if self.checkpoints_total == 0 {
            return 0;
        }
        (((self.checkpoints_completed * 100) + self.checkpoints_total / 2)
            / self.checkpoints_total) as u8
    }

    /// Returns the aggregated round trust score.
    pub fn trust_score(&self) -> u8 {
        self.trust_score
    }

    /// Returns when the guard first started the round.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Returns when the round was last closed.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Returns the device metadata captured at start.
    pub fn device(&self) -> Option<&DeviceInfo> {
        self.device.as_ref()
    }
}
