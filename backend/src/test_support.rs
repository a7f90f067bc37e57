//! Test utilities for the backend crate.
//!
//! This module provides shared helpers for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is only compiled when running tests.

pub mod memory {
    //! Stateful in-memory implementations of the repository ports.
    //!
    //! The fixture repositories under `domain::ports` answer every call with
    //! an empty result, which suits handler tests but not flows that write
    //! and then read back. [`InMemoryPatrolRepository`] keeps real state so
    //! integration tests can drive the domain services end to end without a
    //! database.

    use std::collections::HashMap;
    use std::sync::{Arc, Mutex, MutexGuard};

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use uuid::Uuid;

    use crate::domain::ports::{
        ActivePatrol, AlertFilter, AlertRepository, AlertRepositoryError, CheckpointRepository,
        CheckpointRepositoryError, ExecutionCompletion, ExecutionRepository,
        ExecutionRepositoryError, ExecutionStart, IncidentRepository, IncidentRepositoryError,
        InsertPendingOutcome, MarkRepository, MarkRepositoryError, MonitoringRepository,
        MonitoringRepositoryError, ResolveAlertOutcome, RoundScheduleRepository,
        RoundTemplateRepository, ScheduleRepositoryError, TemplateRepositoryError,
    };
    use crate::domain::{
        Alert, Checkpoint, CheckpointMark, ExecutionStatus, Incident, RoundExecution,
        RoundExecutionDraft, RoundSchedule, RoundTemplate,
    };

    #[derive(Debug, Default)]
    struct State {
        templates: HashMap<Uuid, RoundTemplate>,
        checkpoints: HashMap<Uuid, Checkpoint>,
        schedules: HashMap<Uuid, RoundSchedule>,
        executions: Vec<RoundExecution>,
        marks: Vec<CheckpointMark>,
        incidents: Vec<Incident>,
        alerts: Vec<Alert>,
    }

    /// In-memory stand-in for every persistence adapter.
    ///
    /// Clones share the underlying state, so the same repository can be
    /// handed to several services while the test keeps a handle for seeding
    /// and inspection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use backend::domain::{CheckpointOrdering, RoundTemplate, RoundTemplateDraft};
    /// use backend::test_support::memory::InMemoryPatrolRepository;
    /// use uuid::Uuid;
    ///
    /// let repository = InMemoryPatrolRepository::new();
    /// let template = RoundTemplate::new(RoundTemplateDraft {
    ///     id: Uuid::new_v4(),
    ///     installation_id: Uuid::new_v4(),
    ///     name: "Night perimeter".into(),
    ///     ordering: CheckpointOrdering::Flexible,
    ///     checkpoint_ids: vec![Uuid::new_v4()],
    ///     active: true,
    /// })?;
    /// repository.put_template(template);
    /// assert!(repository.executions().is_empty());
    /// # Ok::<(), backend::domain::PatrolValidationError>(())
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct InMemoryPatrolRepository {
        state: Arc<Mutex<State>>,
    }

    impl InMemoryPatrolRepository {
        /// Create an empty repository.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        fn state(&self) -> MutexGuard<'_, State> {
            self.state.lock().expect("in-memory state poisoned")
        }

        /// Seed a round template.
        pub fn put_template(&self, template: RoundTemplate) {
            self.state().templates.insert(template.id(), template);
        }

        /// Seed a checkpoint.
        pub fn put_checkpoint(&self, checkpoint: Checkpoint) {
            self.state()
                .checkpoints
                .insert(checkpoint.id(), checkpoint);
        }

        /// Seed a round schedule.
        pub fn put_schedule(&self, schedule: RoundSchedule) {
            self.state().schedules.insert(schedule.id(), schedule);
        }

        /// Seed an execution without going through slot generation.
        pub fn put_execution(&self, execution: RoundExecution) {
            self.state().executions.push(execution);
        }

        /// Snapshot of stored executions in insertion order.
        #[must_use]
        pub fn executions(&self) -> Vec<RoundExecution> {
            self.state().executions.clone()
        }

        /// Snapshot of appended marks in insertion order.
        #[must_use]
        pub fn marks(&self) -> Vec<CheckpointMark> {
            self.state().marks.clone()
        }

        /// Snapshot of recorded incidents in insertion order.
        #[must_use]
        pub fn incidents(&self) -> Vec<Incident> {
            self.state().incidents.clone()
        }

        /// Snapshot of raised alerts in insertion order.
        #[must_use]
        pub fn alerts(&self) -> Vec<Alert> {
            self.state().alerts.clone()
        }
    }

    /// Rebuild an execution with updated draft fields.
    ///
    /// Panics when the mutation produces an invalid entity; the services
    /// uphold the draft invariants, so a panic here is a test bug.
    fn rebuild(
        execution: &RoundExecution,
        mutate: impl FnOnce(&mut RoundExecutionDraft),
    ) -> RoundExecution {
        let mut draft = RoundExecutionDraft {
            id: execution.id(),
            template_id: execution.template_id(),
            schedule_id: execution.schedule_id(),
            installation_id: execution.installation_id(),
            scheduled_at: execution.scheduled_at(),
            guard_id: execution.guard_id(),
            status: execution.status(),
            checkpoints_total: execution.checkpoints_total(),
            checkpoints_completed: execution.checkpoints_completed(),
            trust_score: execution.trust_score(),
            started_at: execution.started_at(),
            completed_at: execution.completed_at(),
            device: execution.device().cloned(),
        };
        mutate(&mut draft);
        RoundExecution::new(draft).expect("rebuilt execution is valid")
    }

    #[async_trait]
    impl ExecutionRepository for InMemoryPatrolRepository {
        async fn insert_pending(
            &self,
            execution: &RoundExecution,
        ) -> Result<InsertPendingOutcome, ExecutionRepositoryError> {
            let mut state = self.state();
            let covered = state.executions.iter().any(|existing| {
                existing.schedule_id() == execution.schedule_id()
                    && existing.scheduled_at() == execution.scheduled_at()
            });
            if covered {
                return Ok(InsertPendingOutcome::AlreadyScheduled);
            }
            state.executions.push(execution.clone());
            Ok(InsertPendingOutcome::Created)
        }

        async fn find_by_id(
            &self,
            execution_id: &Uuid,
        ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
            Ok(self
                .state()
                .executions
                .iter()
                .find(|execution| execution.id() == *execution_id)
                .cloned())
        }

        async fn record_start(
            &self,
            execution_id: &Uuid,
            start: &ExecutionStart,
        ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
            let mut state = self.state();
            let Some(slot) = state
                .executions
                .iter_mut()
                .find(|execution| execution.id() == *execution_id)
            else {
                return Ok(None);
            };
            if !slot.status().is_active() {
                return Ok(None);
            }
            let updated = rebuild(slot, |draft| {
                draft.status = ExecutionStatus::InProgress;
                draft.guard_id = Some(start.guard_id);
                draft.started_at = Some(start.started_at);
                draft.device = start.device.clone();
            });
            *slot = updated.clone();
            Ok(Some(updated))
        }

        async fn finalize(
            &self,
            execution_id: &Uuid,
            completion: &ExecutionCompletion,
        ) -> Result<Option<RoundExecution>, ExecutionRepositoryError> {
            let mut state = self.state();
            let Some(slot) = state
                .executions
                .iter_mut()
                .find(|execution| execution.id() == *execution_id)
            else {
                return Ok(None);
            };
            if !slot.status().is_active() {
                return Ok(None);
            }
            let updated = rebuild(slot, |draft| {
                draft.status = completion.status;
                draft.checkpoints_total = completion.checkpoints_total;
                draft.checkpoints_completed = completion.checkpoints_completed;
                draft.trust_score = completion.trust_score;
                draft.completed_at = Some(completion.completed_at);
            });
            *slot = updated.clone();
            Ok(Some(updated))
        }
    }

    #[async_trait]
    impl MarkRepository for InMemoryPatrolRepository {
        async fn append(&self, mark: &CheckpointMark) -> Result<(), MarkRepositoryError> {
            self.state().marks.push(mark.clone());
            Ok(())
        }

        async fn latest_for_execution(
            &self,
            execution_id: &Uuid,
        ) -> Result<Option<CheckpointMark>, MarkRepositoryError> {
            // Ties on `marked_at` resolve to the most recently appended mark.
            Ok(self
                .state()
                .marks
                .iter()
                .filter(|mark| mark.execution_id() == *execution_id)
                .max_by_key(|mark| mark.marked_at())
                .cloned())
        }

        async fn list_for_execution(
            &self,
            execution_id: &Uuid,
        ) -> Result<Vec<CheckpointMark>, MarkRepositoryError> {
            let mut marks: Vec<CheckpointMark> = self
                .state()
                .marks
                .iter()
                .filter(|mark| mark.execution_id() == *execution_id)
                .cloned()
                .collect();
            marks.sort_by_key(|mark| mark.marked_at());
            Ok(marks)
        }
    }

    #[async_trait]
    impl AlertRepository for InMemoryPatrolRepository {
        async fn insert(&self, alert: &Alert) -> Result<(), AlertRepositoryError> {
            self.state().alerts.push(alert.clone());
            Ok(())
        }

        async fn find_by_id(&self, alert_id: &Uuid) -> Result<Option<Alert>, AlertRepositoryError> {
            Ok(self
                .state()
                .alerts
                .iter()
                .find(|alert| alert.id() == *alert_id)
                .cloned())
        }

        async fn resolve(
            &self,
            alert_id: &Uuid,
            resolver_id: &Uuid,
            resolved_at: DateTime<Utc>,
        ) -> Result<ResolveAlertOutcome, AlertRepositoryError> {
            let mut state = self.state();
            let Some(slot) = state
                .alerts
                .iter_mut()
                .find(|alert| alert.id() == *alert_id)
            else {
                return Ok(ResolveAlertOutcome::NotFound);
            };
            if slot.is_resolved() {
                return Ok(ResolveAlertOutcome::AlreadyResolved);
            }
            let updated = slot.clone().resolve(*resolver_id, resolved_at);
            *slot = updated.clone();
            Ok(ResolveAlertOutcome::Resolved(updated))
        }

        async fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertRepositoryError> {
            let state = self.state();
            let mut alerts: Vec<Alert> = state
                .alerts
                .iter()
                .rev()
                .filter(|alert| {
                    filter
                        .installation_id
                        .is_none_or(|id| alert.installation_id() == id)
                })
                .filter(|alert| !filter.unresolved_only || !alert.is_resolved())
                .cloned()
                .collect();
            // Stable sort keeps newest-first order within each group.
            alerts.sort_by_key(Alert::is_resolved);
            Ok(alerts)
        }
    }

    #[async_trait]
    impl CheckpointRepository for InMemoryPatrolRepository {
        async fn find_by_id(
            &self,
            checkpoint_id: &Uuid,
        ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
            Ok(self.state().checkpoints.get(checkpoint_id).cloned())
        }

        async fn find_by_scan_code(
            &self,
            installation_id: &Uuid,
            scan_code: &str,
        ) -> Result<Option<Checkpoint>, CheckpointRepositoryError> {
            Ok(self
                .state()
                .checkpoints
                .values()
                .find(|checkpoint| {
                    checkpoint.installation_id() == *installation_id
                        && checkpoint.scan_code() == scan_code
                        && checkpoint.is_active()
                })
                .cloned())
        }
    }

    #[async_trait]
    impl RoundTemplateRepository for InMemoryPatrolRepository {
        async fn find_by_id(
            &self,
            template_id: &Uuid,
        ) -> Result<Option<RoundTemplate>, TemplateRepositoryError> {
            Ok(self.state().templates.get(template_id).cloned())
        }
    }

    #[async_trait]
    impl RoundScheduleRepository for InMemoryPatrolRepository {
        async fn find_by_id(
            &self,
            schedule_id: &Uuid,
        ) -> Result<Option<RoundSchedule>, ScheduleRepositoryError> {
            Ok(self.state().schedules.get(schedule_id).cloned())
        }

        async fn list_active(&self) -> Result<Vec<RoundSchedule>, ScheduleRepositoryError> {
            let mut schedules: Vec<RoundSchedule> = self
                .state()
                .schedules
                .values()
                .filter(|schedule| schedule.is_active())
                .cloned()
                .collect();
            schedules.sort_by_key(RoundSchedule::id);
            Ok(schedules)
        }
    }

    #[async_trait]
    impl IncidentRepository for InMemoryPatrolRepository {
        async fn insert(&self, incident: &Incident) -> Result<(), IncidentRepositoryError> {
            self.state().incidents.push(incident.clone());
            Ok(())
        }
    }

    #[async_trait]
    impl MonitoringRepository for InMemoryPatrolRepository {
        async fn list_active(
            &self,
            installation_id: Option<Uuid>,
        ) -> Result<Vec<ActivePatrol>, MonitoringRepositoryError> {
            let state = self.state();
            let mut active: Vec<ActivePatrol> = state
                .executions
                .iter()
                .filter(|execution| execution.status() == ExecutionStatus::InProgress)
                .filter(|execution| {
                    installation_id.is_none_or(|id| execution.installation_id() == id)
                })
                .filter_map(|execution| {
                    // Executions without a template row drop out, like the
                    // inner join in the database adapter.
                    let template = state.templates.get(&execution.template_id())?;
                    let latest_mark = state
                        .marks
                        .iter()
                        .filter(|mark| mark.execution_id() == execution.id())
                        .max_by_key(|mark| mark.marked_at())
                        .cloned();
                    Some(ActivePatrol {
                        execution: execution.clone(),
                        template_name: template.name().to_owned(),
                        latest_mark,
                    })
                })
                .collect();
            active.sort_by_key(|patrol| patrol.execution.id());
            Ok(active)
        }
    }
}
