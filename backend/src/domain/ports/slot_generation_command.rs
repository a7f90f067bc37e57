//! Driving port for schedule slot generation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::schedule::SlotWindow;
use crate::domain::Error;

/// Outcome of generating slots for one schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub schedule_id: Uuid,
    pub template_id: Uuid,
    /// Slot instants the schedule produced inside the window.
    pub slots: u32,
    /// Executions created by this pass.
    pub created: u32,
    /// Slots that already had an execution from an earlier pass.
    pub already_scheduled: u32,
}

/// Request to generate slots for one schedule.
///
/// When `window` is omitted the service derives it from the clock and its
/// configured lookahead.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateForScheduleRequest {
    pub schedule_id: Uuid,
    pub window: Option<SlotWindow>,
}

/// Request to run a generation pass over every active schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunGenerationPassRequest {
    pub window: Option<SlotWindow>,
}

/// Driving port for slot generation operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SlotGenerationCommand: Send + Sync {
    /// Generates pending executions for one schedule.
    ///
    /// Re-running over an overlapping window reports existing slots as
    /// `already_scheduled` instead of duplicating them.
    async fn generate_for_schedule(
        &self,
        request: GenerateForScheduleRequest,
    ) -> Result<GenerationReport, Error>;

    /// Generates pending executions for every active schedule.
    async fn run_generation_pass(
        &self,
        request: RunGenerationPassRequest,
    ) -> Result<Vec<GenerationReport>, Error>;
}

/// Fixture command implementation reporting no configured schedules.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureSlotGenerationCommand;

#[async_trait]
impl SlotGenerationCommand for FixtureSlotGenerationCommand {
    async fn generate_for_schedule(
        &self,
        request: GenerateForScheduleRequest,
    ) -> Result<GenerationReport, Error> {
        Err(Error::not_found(format!(
            "round schedule {} was not found",
            request.schedule_id
        )))
    }

    async fn run_generation_pass(
        &self,
        _request: RunGenerationPassRequest,
    ) -> Result<Vec<GenerationReport>, Error> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.

    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    use crate::domain::ErrorCode;

    use super::*;

    #[rstest]
    #[tokio::test]
    async fn fixture_single_schedule_reports_not_found() {
        let command = FixtureSlotGenerationCommand;
        let request = GenerateForScheduleRequest {
            schedule_id: Uuid::new_v4(),
            window: None,
        };

        let err = command
            .generate_for_schedule(request)
            .await
            .expect_err("fixture has no schedules");

        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[tokio::test]
    async fn fixture_pass_reports_nothing() {
        let command = FixtureSlotGenerationCommand;
        let from = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).single().expect("valid window start");
        let to = Utc.with_ymd_and_hms(2026, 3, 3, 0, 0, 0).single().expect("valid window end");
        let request = RunGenerationPassRequest {
            window: Some(SlotWindow::new(from, to).expect("valid window")),
        };

        let reports = command
            .run_generation_pass(request)
            .await
            .expect("fixture pass succeeds");

        assert!(reports.is_empty());
    }

    #[rstest]
    fn report_serializes_camel_case() {
        let report = GenerationReport {
            schedule_id: Uuid::nil(),
            template_id: Uuid::nil(),
            slots: 5,
            created: 3,
            already_scheduled: 2,
        };

        let json = serde_json::to_value(report).expect("report serializes");

        assert_eq!(json["scheduleId"], serde_json::json!(Uuid::nil()));
        assert_eq!(json["alreadyScheduled"], serde_json::json!(2));
    }
}
