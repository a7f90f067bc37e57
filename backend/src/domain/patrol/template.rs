//! Round template entity and checkpoint ordering policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PatrolValidationError;

/// Whether checkpoints must be visited in the listed sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointOrdering {
    /// Checkpoints must be marked in the listed order.
    Strict,
    /// Checkpoints may be marked in any order.
    Flexible,
}

impl CheckpointOrdering {
    /// Stable wire and storage label for the ordering policy.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Flexible => "flexible",
        }
    }
}

impl fmt::Display for CheckpointOrdering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown ordering label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCheckpointOrderingError {
    value: String,
}

impl fmt::Display for ParseCheckpointOrderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown checkpoint ordering: {}", self.value)
    }
}

impl std::error::Error for ParseCheckpointOrderingError {}

impl FromStr for CheckpointOrdering {
    type Err = ParseCheckpointOrderingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "strict" => Ok(Self::Strict),
            "flexible" => Ok(Self::Flexible),
            other => Err(ParseCheckpointOrderingError {
                value: other.to_owned(),
            }),
        }
    }
}

/// Input payload for [`RoundTemplate::new`].
#[derive(Debug, Clone)]
pub struct RoundTemplateDraft {
    pub id: Uuid,
    pub installation_id: Uuid,
    pub name: String,
    pub ordering: CheckpointOrdering,
    pub checkpoint_ids: Vec<Uuid>,
    pub active: bool,
}

/// A reusable definition of one patrol round at an installation.
///
/// # Examples
///
/// ```rust,ignore
/// # let draft = sample_round_template_draft();
/// let template = backend::domain::RoundTemplate::new(draft)?;
/// assert!(template.checkpoint_count() > 0);
/// # Ok::<(), backend::domain::PatrolValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTemplate {
    pub(super) id: Uuid,
    pub(super) installation_id: Uuid,
    pub(super) name: String,
    pub(super) ordering: CheckpointOrdering,
    pub(super) checkpoint_ids: Vec<Uuid>,
    pub(super) active: bool,
}

impl RoundTemplate {
    /// Creates a validated round template.
    pub fn new(draft: RoundTemplateDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the template id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the owning installation id.
    pub fn installation_id(&self) -> Uuid {
        self.installation_id
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the checkpoint ordering policy.
    pub fn ordering(&self) -> CheckpointOrdering {
        self.ordering
    }

    /// Returns the checkpoints of the round in visit order.
    pub fn checkpoint_ids(&self) -> &[Uuid] {
        &self.checkpoint_ids
    }

    /// Returns the number of checkpoints in the round.
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoint_ids.len()
    }

    /// Returns whether the template can drive new executions.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
