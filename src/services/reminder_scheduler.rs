//! Materializes reminder work items for a booked appointment.

use std::sync::Arc;

use tracing::debug;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Appointment, ReminderKind, ReminderWorkItem};
use crate::domain::ports::{Clock, ReminderRepository};

pub struct ReminderScheduler<R: ReminderRepository, C: Clock> {
    reminders: Arc<R>,
    clock: Arc<C>,
}

impl<R: ReminderRepository, C: Clock> ReminderScheduler<R, C> {
    pub fn new(reminders: Arc<R>, clock: Arc<C>) -> Self {
        Self { reminders, clock }
    }

    /// Create one work item per reminder kind whose trigger instant is still
    /// in the future. Past-due reminders are silently dropped: an appointment
    /// starting within 30 minutes gets no reminders at all.
    pub async fn schedule(&self, appointment: &Appointment) -> DomainResult<Vec<ReminderWorkItem>> {
        let now = self.clock.now();
        let mut created = Vec::new();

        for kind in ReminderKind::ALL {
            let trigger_at = appointment.scheduled_at - kind.offset();
            if trigger_at <= now {
                continue;
            }
            let item = ReminderWorkItem::new(
                appointment.org_id,
                appointment.id,
                kind,
                trigger_at,
                now,
            );
            self.reminders.create(&item).await?;
            created.push(item);
        }

        debug!(
            appointment_id = %appointment.id,
            count = created.len(),
            "scheduled reminders"
        );
        Ok(created)
    }
}
