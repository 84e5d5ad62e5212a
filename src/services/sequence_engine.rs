//! Follow-up sequence state machine.
//!
//! Drives `FollowUpExecution`s through their sequence's steps over time.
//! The engine is synchronous and stateless between calls: the only temporal
//! state is the persisted `next_action_at` instant, which an external
//! periodic trigger (see `application::FollowUpPoller`) is expected to poll,
//! invoking `tick` for every execution that has come due.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{
    ExecutionStatus, FollowUpExecution, FollowUpTarget, Sequence, SequenceStep, StepAction,
};
use crate::domain::ports::{
    ActionDispatcher, Clock, CrmLookup, DispatchAction, DispatchEnvelope, ExecutionInsert,
    ExecutionRepository, SequenceRepository,
};
use crate::services::condition_evaluator::ConditionEvaluator;
use crate::services::personalization::PersonalizationEngine;
use crate::services::template_catalog::TemplateCatalog;

pub struct SequenceEngine<S, E, L, D, C>
where
    S: SequenceRepository,
    E: ExecutionRepository,
    L: CrmLookup,
    D: ActionDispatcher,
    C: Clock,
{
    sequences: Arc<S>,
    executions: Arc<E>,
    evaluator: ConditionEvaluator<L, C>,
    personalizer: PersonalizationEngine<L>,
    dispatcher: Arc<D>,
    catalog: TemplateCatalog,
    clock: Arc<C>,
}

impl<S, E, L, D, C> SequenceEngine<S, E, L, D, C>
where
    S: SequenceRepository,
    E: ExecutionRepository,
    L: CrmLookup,
    D: ActionDispatcher,
    C: Clock,
{
    pub fn new(
        sequences: Arc<S>,
        executions: Arc<E>,
        crm: Arc<L>,
        dispatcher: Arc<D>,
        catalog: TemplateCatalog,
        clock: Arc<C>,
    ) -> Self {
        Self {
            sequences,
            executions,
            evaluator: ConditionEvaluator::new(Arc::clone(&crm), Arc::clone(&clock)),
            personalizer: PersonalizationEngine::new(crm),
            dispatcher,
            catalog,
            clock,
        }
    }

    /// Validate and persist a new sequence definition.
    pub async fn create_sequence(&self, sequence: Sequence) -> DomainResult<Sequence> {
        sequence.validate()?;
        self.sequences.create(&sequence).await?;
        info!(sequence_id = %sequence.id, name = %sequence.name, "created sequence");
        Ok(sequence)
    }

    /// Start an execution of a specific sequence for a target.
    pub async fn start(
        &self,
        org_id: Uuid,
        sequence_id: Uuid,
        target: FollowUpTarget,
        customizations: HashMap<String, Value>,
    ) -> DomainResult<FollowUpExecution> {
        let sequence = self
            .sequences
            .get(org_id, sequence_id)
            .await?
            .filter(|s| s.active)
            .ok_or(DomainError::SequenceNotFound(sequence_id))?;

        self.start_from_sequence(&sequence, target, customizations)
            .await
    }

    /// Start automation for a trigger event: pick the first active sequence
    /// whose conditions match (falling back to the first candidate when none
    /// explicitly match), or synthesize a built-in default when the org has
    /// no sequence for the event at all.
    pub async fn trigger_smart(
        &self,
        org_id: Uuid,
        trigger_event: &str,
        target: FollowUpTarget,
        customizations: HashMap<String, Value>,
    ) -> DomainResult<FollowUpExecution> {
        let candidates = self
            .sequences
            .list_active_by_trigger(org_id, trigger_event)
            .await?;

        if candidates.is_empty() {
            let Some(sequence) = self.catalog.synthesize(org_id, trigger_event, self.clock.now())
            else {
                return Err(DomainError::UnknownTriggerEvent(trigger_event.to_string()));
            };
            info!(
                org_id = %org_id,
                trigger_event,
                sequence = %sequence.name,
                "no sequence registered; synthesizing built-in default"
            );
            self.sequences.create(&sequence).await?;
            return self
                .start_from_sequence(&sequence, target, customizations)
                .await;
        }

        let mut selected = None;
        for candidate in &candidates {
            if self
                .evaluator
                .evaluate(&candidate.conditions, org_id, &target)
                .await
            {
                selected = Some(candidate);
                break;
            }
        }
        let sequence = match selected {
            Some(sequence) => sequence,
            None => {
                // Preserved legacy behavior: a non-matching candidate list is
                // not treated as "no candidate".
                warn!(
                    org_id = %org_id,
                    trigger_event,
                    fallback = %candidates[0].name,
                    "no sequence conditions matched; falling back to first candidate"
                );
                &candidates[0]
            }
        };

        self.start_from_sequence(sequence, target, customizations)
            .await
    }

    async fn start_from_sequence(
        &self,
        sequence: &Sequence,
        target: FollowUpTarget,
        customizations: HashMap<String, Value>,
    ) -> DomainResult<FollowUpExecution> {
        let now = self.clock.now();
        let first_delay = sequence
            .steps
            .first()
            .map(|s| s.delay_minutes())
            .unwrap_or(0);
        let next_action_at = now + chrono::Duration::minutes(first_delay);

        let mut execution = FollowUpExecution::new(
            sequence.org_id,
            sequence.id,
            target,
            customizations,
            next_action_at,
            now,
        );

        match self.executions.create_if_absent(&execution).await? {
            ExecutionInsert::Created => {}
            ExecutionInsert::DuplicateActive { existing } => {
                return Err(DomainError::DuplicateExecution { existing });
            }
        }

        // Personalize every flagged step up front and cache the result on the
        // execution, rather than lazily at send time.
        for step in &sequence.steps {
            if !step.personalize {
                continue;
            }
            let content = self
                .personalizer
                .personalize(
                    &step.content,
                    sequence.org_id,
                    &execution.target,
                    &execution.customizations,
                )
                .await;
            execution.personalized_content.insert(step.step_number, content);
        }
        execution.updated_at = self.clock.now();
        self.executions.update(&execution).await?;

        info!(
            execution_id = %execution.id,
            sequence_id = %sequence.id,
            next_action_at = %execution.next_action_at,
            "started follow-up execution"
        );
        Ok(execution)
    }

    /// Advance one due step of an execution.
    ///
    /// No-op (and idempotent) when the execution is not active or not yet
    /// due. A failed dispatch leaves the step uncompleted so the next poll
    /// retries it; `next_action_at` never moves backward.
    pub async fn tick(&self, execution_id: Uuid) -> DomainResult<FollowUpExecution> {
        let mut execution = self
            .executions
            .get(execution_id)
            .await?
            .ok_or(DomainError::ExecutionNotFound(execution_id))?;

        if execution.status != ExecutionStatus::Active {
            return Ok(execution);
        }

        let now = self.clock.now();
        if now < execution.next_action_at {
            return Ok(execution);
        }

        let sequence = self
            .sequences
            .get(execution.org_id, execution.sequence_id)
            .await?
            .ok_or(DomainError::SequenceNotFound(execution.sequence_id))?;

        let total_steps = u32::try_from(sequence.steps.len()).unwrap_or(u32::MAX);
        let Some(step_number) = execution.current_step(total_steps) else {
            execution.status = ExecutionStatus::Completed;
            execution.updated_at = now;
            self.executions.update(&execution).await?;
            return Ok(execution);
        };
        let step = sequence
            .step(step_number)
            .ok_or_else(|| DomainError::ValidationFailed(format!(
                "sequence {} has no step {step_number}",
                sequence.id
            )))?;

        let step_matches = match &step.conditions {
            Some(conditions) => {
                self.evaluator
                    .evaluate(conditions, execution.org_id, &execution.target)
                    .await
            }
            None => true,
        };

        if step_matches {
            let envelope = DispatchEnvelope {
                org_id: execution.org_id,
                target: execution.target,
                action: self.step_action(&execution, &sequence, step),
            };
            self.dispatcher
                .dispatch(envelope)
                .await
                .map_err(|e| DomainError::DispatchFailed(e.to_string()))?;
            debug!(
                execution_id = %execution.id,
                step = step_number,
                action = step.action.as_str(),
                "dispatched step action"
            );
        } else {
            debug!(
                execution_id = %execution.id,
                step = step_number,
                "step conditions did not match; skipping dispatch"
            );
        }

        execution.mark_step_completed(step_number);
        match execution.current_step(total_steps) {
            Some(next) => {
                let delay = sequence.step(next).map(|s| s.delay_minutes()).unwrap_or(0);
                execution.next_action_at = now + chrono::Duration::minutes(delay);
            }
            None => {
                execution.status = ExecutionStatus::Completed;
                info!(execution_id = %execution.id, "execution completed");
            }
        }
        execution.updated_at = now;
        self.executions.update(&execution).await?;
        Ok(execution)
    }

    /// Build the dispatchable action for a step, preferring the content
    /// personalized at start time.
    fn step_action(
        &self,
        execution: &FollowUpExecution,
        sequence: &Sequence,
        step: &SequenceStep,
    ) -> DispatchAction {
        let content = execution
            .personalized_content
            .get(&step.step_number)
            .cloned()
            .unwrap_or_else(|| step.content.clone());

        match step.action {
            StepAction::SendEmail => DispatchAction::SendEmail {
                subject: step.subject.clone(),
                body: content,
            },
            StepAction::SendSms => DispatchAction::SendSms { body: content },
            StepAction::CreateTask => DispatchAction::CreateTask {
                title: step
                    .subject
                    .clone()
                    .unwrap_or_else(|| format!("{} follow-up", sequence.name)),
                details: content,
            },
            StepAction::ScheduleCall => DispatchAction::ScheduleCall { notes: content },
        }
    }
}
