//! Repository contract for follow-up sequence persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Sequence;

/// Filter for sequence listings.
#[derive(Debug, Clone, Default)]
pub struct SequenceFilter {
    pub active: Option<bool>,
    pub trigger_event: Option<String>,
}

#[async_trait]
pub trait SequenceRepository: Send + Sync {
    async fn create(&self, sequence: &Sequence) -> DomainResult<()>;

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomainResult<Option<Sequence>>;

    async fn update(&self, sequence: &Sequence) -> DomainResult<()>;

    async fn list(&self, org_id: Uuid, filter: &SequenceFilter) -> DomainResult<Vec<Sequence>>;

    /// Active sequences registered for a trigger event, in creation order.
    async fn list_active_by_trigger(
        &self,
        org_id: Uuid,
        trigger_event: &str,
    ) -> DomainResult<Vec<Sequence>>;
}
