//! Common test utilities for integration tests
//!
//! Shared fixtures and helpers used across the integration test files:
//! migrated in-memory pools, CRM seed data, and a dispatcher that records
//! everything it is handed.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use cadence::adapters::sqlite::create_migrated_test_pool;
use cadence::domain::ports::{ActionDispatcher, DispatchEnvelope, DispatchError};

/// Create an in-memory database with all migrations applied.
pub async fn setup_pool() -> SqlitePool {
    create_migrated_test_pool()
        .await
        .expect("failed to create migrated test pool")
}

/// A fixed instant far from any timezone edge, for deterministic clocks.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
}

/// Insert a contact row and return its id.
#[allow(dead_code)]
pub async fn seed_contact(
    pool: &SqlitePool,
    org_id: Uuid,
    first_name: &str,
    last_name: &str,
    tags: &[&str],
) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO contacts (id, org_id, first_name, last_name, email, tags, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id.to_string())
    .bind(org_id.to_string())
    .bind(first_name)
    .bind(last_name)
    .bind(format!("{}@example.com", first_name.to_lowercase()))
    .bind(serde_json::to_string(tags).expect("serialize tags"))
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .expect("failed to seed contact");
    id
}

/// Insert a lead row and return its id.
#[allow(dead_code)]
pub async fn seed_lead(pool: &SqlitePool, org_id: Uuid, stage: &str, contact_id: Option<Uuid>) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO leads (id, org_id, title, stage, value, contact_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(id.to_string())
    .bind(org_id.to_string())
    .bind("3BR house hunt")
    .bind(stage)
    .bind(450_000.0)
    .bind(contact_id.map(|c| c.to_string()))
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await
    .expect("failed to seed lead");
    id
}

/// A dispatcher that records every envelope it receives.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<DispatchEnvelope>>,
}

impl RecordingDispatcher {
    #[allow(dead_code)]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("dispatcher lock").len()
    }

    #[allow(dead_code)]
    pub fn last(&self) -> Option<DispatchEnvelope> {
        self.sent.lock().expect("dispatcher lock").last().cloned()
    }
}

#[async_trait]
impl ActionDispatcher for RecordingDispatcher {
    async fn dispatch(&self, envelope: DispatchEnvelope) -> Result<(), DispatchError> {
        self.sent.lock().expect("dispatcher lock").push(envelope);
        Ok(())
    }
}

/// A dispatcher that always fails, for delivery-retry tests.
#[allow(dead_code)]
#[derive(Default)]
pub struct FailingDispatcher;

#[async_trait]
impl ActionDispatcher for FailingDispatcher {
    async fn dispatch(&self, _envelope: DispatchEnvelope) -> Result<(), DispatchError> {
        Err(DispatchError("delivery backend unavailable".to_string()))
    }
}
