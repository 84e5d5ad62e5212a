//! Read-only CRM snapshot types used by personalization and condition
//! evaluation. Persistence of contacts and leads is owned by the wider CRM;
//! the engine only ever looks them up by id within an organization.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A CRM contact snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub org_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Contact {
    /// "First Last", trimmed when either part is empty.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A CRM lead snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: Uuid,
    pub org_id: Uuid,
    pub title: Option<String>,
    pub stage: String,
    pub value: Option<f64>,
    pub contact_id: Option<Uuid>,
}
