//! SQLite adapter for ReminderRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_optional_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ReminderKind, ReminderWorkItem};
use crate::domain::ports::ReminderRepository;

#[derive(Clone)]
pub struct SqliteReminderRepository {
    pool: SqlitePool,
}

impl SqliteReminderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ReminderRow {
    id: String,
    org_id: String,
    appointment_id: String,
    kind: String,
    trigger_at: String,
    dispatched_at: Option<String>,
    created_at: String,
}

fn row_to_reminder(row: ReminderRow) -> DomainResult<ReminderWorkItem> {
    Ok(ReminderWorkItem {
        id: parse_uuid(&row.id)?,
        org_id: parse_uuid(&row.org_id)?,
        appointment_id: parse_uuid(&row.appointment_id)?,
        kind: ReminderKind::from_str(&row.kind).ok_or_else(|| {
            DomainError::SerializationError(format!("unknown reminder kind: {}", row.kind))
        })?,
        trigger_at: parse_datetime(&row.trigger_at)?,
        dispatched_at: parse_optional_datetime(row.dispatched_at)?,
        created_at: parse_datetime(&row.created_at)?,
    })
}

#[async_trait]
impl ReminderRepository for SqliteReminderRepository {
    async fn create(&self, reminder: &ReminderWorkItem) -> DomainResult<()> {
        sqlx::query(
            "INSERT INTO reminders
             (id, org_id, appointment_id, kind, trigger_at, dispatched_at, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(reminder.id.to_string())
        .bind(reminder.org_id.to_string())
        .bind(reminder.appointment_id.to_string())
        .bind(reminder.kind.as_str())
        .bind(format_datetime(reminder.trigger_at))
        .bind(reminder.dispatched_at.map(format_datetime))
        .bind(format_datetime(reminder.created_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_for_appointment(
        &self,
        appointment_id: Uuid,
    ) -> DomainResult<Vec<ReminderWorkItem>> {
        let rows: Vec<ReminderRow> = sqlx::query_as(
            "SELECT * FROM reminders WHERE appointment_id = ?1 ORDER BY trigger_at",
        )
        .bind(appointment_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_reminder).collect()
    }

    async fn list_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> DomainResult<Vec<ReminderWorkItem>> {
        let rows: Vec<ReminderRow> = sqlx::query_as(
            "SELECT * FROM reminders
             WHERE dispatched_at IS NULL AND trigger_at <= ?1
             ORDER BY trigger_at
             LIMIT ?2",
        )
        .bind(format_datetime(now))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_reminder).collect()
    }

    async fn mark_dispatched(&self, id: Uuid, at: DateTime<Utc>) -> DomainResult<()> {
        let result = sqlx::query("UPDATE reminders SET dispatched_at = ?2 WHERE id = ?1")
            .bind(id.to_string())
            .bind(format_datetime(at))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ReminderNotFound(id));
        }
        Ok(())
    }
}
