//! Repository contract for follow-up execution persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::FollowUpExecution;

/// Outcome of the atomic create-unless-duplicate operation.
///
/// At most one `active` execution may exist per (org, sequence, target);
/// the storage layer enforces this with a uniqueness constraint so two
/// concurrent starts cannot both succeed.
#[derive(Debug)]
pub enum ExecutionInsert {
    Created,
    /// An active execution already exists for the tuple.
    DuplicateActive { existing: Uuid },
}

#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    async fn create_if_absent(
        &self,
        execution: &FollowUpExecution,
    ) -> DomainResult<ExecutionInsert>;

    async fn get(&self, id: Uuid) -> DomainResult<Option<FollowUpExecution>>;

    async fn update(&self, execution: &FollowUpExecution) -> DomainResult<()>;

    /// Active executions whose `next_action_at` has elapsed, oldest first.
    /// This is the polling surface for the external time trigger.
    async fn list_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> DomainResult<Vec<FollowUpExecution>>;
}
