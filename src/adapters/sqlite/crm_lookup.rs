//! SQLite adapter for the read-only CRM lookup port.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::domain::models::{Contact, Lead};
use crate::domain::ports::{CrmLookup, LookupError};

#[derive(Clone)]
pub struct SqliteCrmLookup {
    pool: SqlitePool,
}

impl SqliteCrmLookup {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ContactRow {
    id: String,
    org_id: String,
    first_name: String,
    last_name: String,
    email: Option<String>,
    tags: String,
}

#[derive(sqlx::FromRow)]
struct LeadRow {
    id: String,
    org_id: String,
    title: Option<String>,
    stage: String,
    value: Option<f64>,
    contact_id: Option<String>,
}

fn parse(s: &str) -> Result<Uuid, LookupError> {
    Uuid::parse_str(s).map_err(|e| LookupError(e.to_string()))
}

#[async_trait]
impl CrmLookup for SqliteCrmLookup {
    async fn get_contact(&self, org_id: Uuid, id: Uuid) -> Result<Option<Contact>, LookupError> {
        let row: Option<ContactRow> = sqlx::query_as(
            "SELECT id, org_id, first_name, last_name, email, tags
             FROM contacts WHERE org_id = ?1 AND id = ?2",
        )
        .bind(org_id.to_string())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LookupError(e.to_string()))?;

        row.map(|row| {
            Ok(Contact {
                id: parse(&row.id)?,
                org_id: parse(&row.org_id)?,
                first_name: row.first_name,
                last_name: row.last_name,
                email: row.email,
                tags: serde_json::from_str(&row.tags).map_err(|e| LookupError(e.to_string()))?,
            })
        })
        .transpose()
    }

    async fn get_lead(&self, org_id: Uuid, id: Uuid) -> Result<Option<Lead>, LookupError> {
        let row: Option<LeadRow> = sqlx::query_as(
            "SELECT id, org_id, title, stage, value, contact_id
             FROM leads WHERE org_id = ?1 AND id = ?2",
        )
        .bind(org_id.to_string())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LookupError(e.to_string()))?;

        row.map(|row| {
            Ok(Lead {
                id: parse(&row.id)?,
                org_id: parse(&row.org_id)?,
                title: row.title,
                stage: row.stage,
                value: row.value,
                contact_id: row.contact_id.as_deref().map(parse).transpose()?,
            })
        })
        .transpose()
    }
}
