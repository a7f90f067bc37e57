//! Round schedule entity: the recurrence rule that spawns executions.

use chrono::NaiveTime;
use uuid::Uuid;

use crate::domain::schedule::WeekdaySet;

use super::PatrolValidationError;

/// Input payload for [`RoundSchedule::new`].
#[derive(Debug, Clone)]
pub struct RoundScheduleDraft {
    pub id: Uuid,
    pub template_id: Uuid,
    pub weekdays: WeekdaySet,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub frequency_minutes: u32,
    pub tolerance_minutes: u32,
    pub active: bool,
}

/// A recurrence rule binding a template to concrete patrol slots.
///
/// An end time at or before the start time denotes an overnight window that
/// spans midnight into the following day.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSchedule {
    pub(super) id: Uuid,
    pub(super) template_id: Uuid,
    pub(super) weekdays: WeekdaySet,
    pub(super) start_time: NaiveTime,
    pub(super) end_time: NaiveTime,
    pub(super) frequency_minutes: u32,
    pub(super) tolerance_minutes: u32,
    pub(super) active: bool,
}

impl RoundSchedule {
    /// Creates a validated round schedule.
    pub fn new(draft: RoundScheduleDraft) -> Result<Self, PatrolValidationError> {
        Self::try_from(draft)
    }

    /// Returns the schedule id.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the template this schedule instantiates.
    pub fn template_id(&self) -> Uuid {
        self.template_id
    }

    /// Returns the weekdays the schedule runs on.
    pub fn weekdays(&self) -> WeekdaySet {
        self.weekdays
    }

    /// Returns the daily window start time.
    pub fn start_time(&self) -> NaiveTime {
        self.start_time
    }

    /// Returns the daily window end time.
    pub fn end_time(&self) -> NaiveTime {
        self.end_time
    }

    /// Returns the slot frequency in minutes.
    pub fn frequency_minutes(&self) -> u32 {
        self.frequency_minutes
    }

    /// Returns the grace period for starting a slot, in minutes.
    pub fn tolerance_minutes(&self) -> u32 {
        self.tolerance_minutes
    }

    /// Returns whether the schedule participates in generation passes.
    pub fn is_active(&self) -> bool {
        self.active
    }
}
