//! Repository contract for reminder work items.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::ReminderWorkItem;

#[async_trait]
pub trait ReminderRepository: Send + Sync {
    async fn create(&self, reminder: &ReminderWorkItem) -> DomainResult<()>;

    async fn list_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> DomainResult<Vec<ReminderWorkItem>>;

    /// Undispatched reminders whose trigger instant has elapsed, oldest first.
    async fn list_due(&self, now: DateTime<Utc>, limit: u32)
        -> DomainResult<Vec<ReminderWorkItem>>;

    /// Record that a reminder has been handed to the dispatcher.
    async fn mark_dispatched(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()>;
}
