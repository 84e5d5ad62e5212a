//! Read-only contact/lead lookup into the wider CRM.
//!
//! Lookup failures are non-fatal by policy: personalization falls back to a
//! neutral label and condition evaluation fails open. Callers log and
//! degrade; they never surface `LookupError` to the API caller.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::{Contact, Lead};

#[derive(Debug, Error)]
#[error("CRM lookup failed: {0}")]
pub struct LookupError(pub String);

#[async_trait]
pub trait CrmLookup: Send + Sync {
    /// `Ok(None)` means the contact does not exist (or is not owned by the
    /// organization); `Err` means the lookup itself failed.
    async fn get_contact(&self, org_id: Uuid, id: Uuid) -> Result<Option<Contact>, LookupError>;

    async fn get_lead(&self, org_id: Uuid, id: Uuid) -> Result<Option<Lead>, LookupError>;
}
