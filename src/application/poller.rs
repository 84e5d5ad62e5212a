//! Periodic trigger driving due follow-up steps and reminders.
//!
//! The engine itself holds no timers; this poller scans for executions whose
//! `next_action_at` has elapsed and ticks them, and hands due reminders to
//! the action dispatcher. Reminder dispatch is retried with exponential
//! backoff and marked dispatched only after success, so delivery is
//! at-least-once. Errors are logged and never stop the loop.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use backoff::ExponentialBackoff;
use tracing::{debug, error, info};

use crate::domain::models::{FollowUpTarget, PollerConfig};
use crate::domain::ports::{
    ActionDispatcher, Clock, CrmLookup, DispatchAction, DispatchEnvelope, ExecutionRepository,
    ReminderRepository, SequenceRepository,
};
use crate::services::SequenceEngine;

pub struct FollowUpPoller<S, E, R, L, D, C>
where
    S: SequenceRepository,
    E: ExecutionRepository,
    R: ReminderRepository,
    L: CrmLookup,
    D: ActionDispatcher,
    C: Clock,
{
    engine: Arc<SequenceEngine<S, E, L, D, C>>,
    executions: Arc<E>,
    reminders: Arc<R>,
    dispatcher: Arc<D>,
    clock: Arc<C>,
    config: PollerConfig,
    running: Arc<AtomicBool>,
}

impl<S, E, R, L, D, C> FollowUpPoller<S, E, R, L, D, C>
where
    S: SequenceRepository,
    E: ExecutionRepository,
    R: ReminderRepository,
    L: CrmLookup,
    D: ActionDispatcher,
    C: Clock,
{
    pub fn new(
        engine: Arc<SequenceEngine<S, E, L, D, C>>,
        executions: Arc<E>,
        reminders: Arc<R>,
        dispatcher: Arc<D>,
        clock: Arc<C>,
        config: PollerConfig,
    ) -> Self {
        Self {
            engine,
            executions,
            reminders,
            dispatcher,
            clock,
            config,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Run until `stop` is called. Each tick advances due executions and
    /// dispatches due reminders.
    pub async fn run(&self) {
        self.running.store(true, Ordering::SeqCst);
        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.tick_interval_secs.max(1)));
        info!(
            tick_interval_secs = self.config.tick_interval_secs,
            "follow-up poller started"
        );

        while self.running.load(Ordering::SeqCst) {
            interval.tick().await;
            self.poll_once().await;
        }
        info!("follow-up poller stopped");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// One scan over due work. Public so a single pass can be driven
    /// explicitly (tests, cron-style invocation).
    pub async fn poll_once(&self) {
        self.tick_due_executions().await;
        self.dispatch_due_reminders().await;
    }

    async fn tick_due_executions(&self) {
        let now = self.clock.now();
        let due = match self.executions.list_due(now, self.config.batch_size).await {
            Ok(due) => due,
            Err(err) => {
                error!(error = %err, "failed to list due executions");
                return;
            }
        };
        if due.is_empty() {
            return;
        }
        debug!(count = due.len(), "ticking due executions");

        for execution in due {
            if let Err(err) = self.engine.tick(execution.id).await {
                error!(execution_id = %execution.id, error = %err, "tick failed");
            }
        }
    }

    async fn dispatch_due_reminders(&self) {
        let now = self.clock.now();
        let due = match self.reminders.list_due(now, self.config.batch_size).await {
            Ok(due) => due,
            Err(err) => {
                error!(error = %err, "failed to list due reminders");
                return;
            }
        };

        for reminder in due {
            let envelope = DispatchEnvelope {
                org_id: reminder.org_id,
                target: FollowUpTarget::default(),
                action: DispatchAction::AppointmentReminder {
                    appointment_id: reminder.appointment_id,
                    kind: reminder.kind,
                },
            };

            let policy = ExponentialBackoff {
                max_elapsed_time: Some(Duration::from_secs(
                    self.config.dispatch_max_elapsed_secs,
                )),
                ..Default::default()
            };
            let dispatcher = Arc::clone(&self.dispatcher);
            let result = backoff::future::retry(policy, || {
                let envelope = envelope.clone();
                let dispatcher = Arc::clone(&dispatcher);
                async move {
                    dispatcher
                        .dispatch(envelope)
                        .await
                        .map_err(backoff::Error::transient)
                }
            })
            .await;

            match result {
                Ok(()) => {
                    if let Err(err) = self
                        .reminders
                        .mark_dispatched(reminder.id, self.clock.now())
                        .await
                    {
                        error!(reminder_id = %reminder.id, error = %err, "failed to mark reminder dispatched");
                    }
                }
                Err(err) => {
                    error!(reminder_id = %reminder.id, error = %err, "reminder dispatch exhausted retries");
                }
            }
        }
    }
}
