//! Slot generation domain service.
//!
//! Expands active round schedules into pending executions over a bounded
//! window. Re-running a pass over an overlapping window is harmless: the
//! execution repository reports already-covered slots instead of
//! duplicating them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use mockable::Clock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::ports::{
    ExecutionRepository, ExecutionRepositoryError, GenerateForScheduleRequest, GenerationReport,
    InsertPendingOutcome, RoundScheduleRepository, RoundTemplateRepository,
    RunGenerationPassRequest, ScheduleRepositoryError, SlotGenerationCommand,
    TemplateRepositoryError,
};
use crate::domain::schedule::{SlotWindow, build_schedule_slots};
use crate::domain::{ExecutionStatus, RoundExecution, RoundExecutionDraft, RoundSchedule, RoundTemplate};

fn map_schedule_error(error: ScheduleRepositoryError) -> Error {
    match error {
        ScheduleRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round schedule repository unavailable: {message}"))
        }
        ScheduleRepositoryError::Query { message } => {
            Error::internal(format!("round schedule repository error: {message}"))
        }
    }
}

fn map_template_error(error: TemplateRepositoryError) -> Error {
    match error {
        TemplateRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round template repository unavailable: {message}"))
        }
        TemplateRepositoryError::Query { message } => {
            Error::internal(format!("round template repository error: {message}"))
        }
    }
}

fn map_execution_error(error: ExecutionRepositoryError) -> Error {
    match error {
        ExecutionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("round execution repository unavailable: {message}"))
        }
        ExecutionRepositoryError::Query { message } => {
            Error::internal(format!("round execution repository error: {message}"))
        }
    }
}

/// Slot generation service implementing the generation command port.
#[derive(Clone)]
pub struct SlotGenerationService<S, T, E> {
    schedules: Arc<S>,
    templates: Arc<T>,
    executions: Arc<E>,
    clock: Arc<dyn Clock>,
    lookahead_hours: u32,
}

impl<S, T, E> SlotGenerationService<S, T, E> {
    /// Create a slot generation service with the given repositories, clock,
    /// and default lookahead used when callers omit a window.
    pub fn new(
        schedules: Arc<S>,
        templates: Arc<T>,
        executions: Arc<E>,
        clock: Arc<dyn Clock>,
        lookahead_hours: u32,
    ) -> Self {
        Self {
            schedules,
            templates,
            executions,
            clock,
            lookahead_hours,
        }
    }

    fn window_or_default(&self, window: Option<SlotWindow>) -> Result<SlotWindow, Error> {
        match window {
            Some(window) => Ok(window),
            None => {
                let from = self.clock.utc();
                let to = from + Duration::hours(i64::from(self.lookahead_hours));
                SlotWindow::new(from, to)
                    .map_err(|err| Error::internal(format!("invalid default window: {err}")))
            }
        }
    }
}

impl<S, T, E> SlotGenerationService<S, T, E>
where
    E: ExecutionRepository,
{
    async fn generate(
        &self,
        schedule: &RoundSchedule,
        template: &RoundTemplate,
        window: &SlotWindow,
    ) -> Result<GenerationReport, Error> {
        let slots = build_schedule_slots(
            window,
            &schedule.weekdays(),
            schedule.start_time(),
            schedule.end_time(),
            schedule.frequency_minutes(),
        );

        let mut created = 0u32;
        let mut already_scheduled = 0u32;
        for scheduled_at in &slots {
            let execution = RoundExecution::new(RoundExecutionDraft {
                id: Uuid::new_v4(),
                template_id: template.id(),
                schedule_id: schedule.id(),
                installation_id: template.installation_id(),
                scheduled_at: *scheduled_at,
                guard_id: None,
                status: ExecutionStatus::Pending,
                checkpoints_total: template.checkpoint_count() as u32,
                checkpoints_completed: 0,
                trust_score: 0,
                started_at: None,
                completed_at: None,
                device: None,
            })
            .map_err(|err| Error::internal(format!("invalid pending execution state: {err}")))?;

            match self
                .executions
                .insert_pending(&execution)
                .await
                .map_err(map_execution_error)?
            {
                InsertPendingOutcome::Created => created += 1,
                InsertPendingOutcome::AlreadyScheduled => already_scheduled += 1,
            }
        }

        let report = GenerationReport {
            schedule_id: schedule.id(),
            template_id: template.id(),
            slots: slots.len() as u32,
            created,
            already_scheduled,
        };
        info!(
            schedule_id = %report.schedule_id,
            slots = report.slots,
            created = report.created,
            already_scheduled = report.already_scheduled,
            "schedule slots generated"
        );
        Ok(report)
    }
}

#[async_trait]
impl<S, T, E> SlotGenerationCommand for SlotGenerationService<S, T, E>
where
    S: RoundScheduleRepository,
    T: RoundTemplateRepository,
    E: ExecutionRepository,
{
    async fn generate_for_schedule(
        &self,
        request: GenerateForScheduleRequest,
    ) -> Result<GenerationReport, Error> {
        let schedule = self
            .schedules
            .find_by_id(&request.schedule_id)
            .await
            .map_err(map_schedule_error)?
            .ok_or_else(|| {
                Error::not_found(format!("round schedule {} was not found", request.schedule_id))
            })?;
        if !schedule.is_active() {
            return Err(Error::invalid_state(format!(
                "round schedule {} is inactive",
                schedule.id()
            )));
        }

        let template = self
            .templates
            .find_by_id(&schedule.template_id())
            .await
            .map_err(map_template_error)?
            .ok_or_else(|| {
                Error::not_found(format!(
                    "round template {} was not found",
                    schedule.template_id()
                ))
            })?;
        if !template.is_active() {
            return Err(Error::invalid_state(format!(
                "round template {} is inactive",
                template.id()
            )));
        }

        let window = self.window_or_default(request.window)?;
        self.generate(&schedule, &template, &window).await
    }

    async fn run_generation_pass(
        &self,
        request: RunGenerationPassRequest,
    ) -> Result<Vec<GenerationReport>, Error> {
        let window = self.window_or_default(request.window)?;
        let schedules = self
            .schedules
            .list_active()
            .await
            .map_err(map_schedule_error)?;

        let mut reports = Vec::with_capacity(schedules.len());
        for schedule in &schedules {
            let Some(template) = self
                .templates
                .find_by_id(&schedule.template_id())
                .await
                .map_err(map_template_error)?
            else {
                warn!(
                    schedule_id = %schedule.id(),
                    template_id = %schedule.template_id(),
                    "skipping schedule whose template is missing"
                );
                continue;
            };
            if !template.is_active() {
                continue;
            }
            reports.push(self.generate(schedule, &template, &window).await?);
        }

        info!(
            schedules = reports.len(),
            created = reports.iter().map(|report| report.created).sum::<u32>(),
            "slot generation pass finished"
        );
        Ok(reports)
    }
}

#[cfg(test)]
#[path = "slot_generation_service_tests.rs"]
mod tests;
