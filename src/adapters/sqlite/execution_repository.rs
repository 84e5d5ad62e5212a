//! SQLite adapter for ExecutionRepository.
//!
//! The at-most-one-active invariant is enforced by a partial unique index
//! over (org_id, sequence_id, contact_id, lead_id) filtered to active rows;
//! `create_if_absent` maps the constraint violation back to the surviving
//! execution's id.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_optional_uuid, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ExecutionStatus, FollowUpExecution, FollowUpTarget};
use crate::domain::ports::{ExecutionInsert, ExecutionRepository};

#[derive(Clone)]
pub struct SqliteExecutionRepository {
    pool: SqlitePool,
}

impl SqliteExecutionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_active_for_tuple(
        &self,
        execution: &FollowUpExecution,
    ) -> DomainResult<Option<Uuid>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT id FROM follow_up_executions
             WHERE org_id = ?1 AND sequence_id = ?2
               AND COALESCE(contact_id, '') = ?3
               AND COALESCE(lead_id, '') = ?4
               AND status = 'active'",
        )
        .bind(execution.org_id.to_string())
        .bind(execution.sequence_id.to_string())
        .bind(
            execution
                .target
                .contact_id
                .map(|u| u.to_string())
                .unwrap_or_default(),
        )
        .bind(
            execution
                .target
                .lead_id
                .map(|u| u.to_string())
                .unwrap_or_default(),
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|(id,)| parse_uuid(&id)).transpose()
    }
}

#[derive(sqlx::FromRow)]
struct ExecutionRow {
    id: String,
    org_id: String,
    sequence_id: String,
    contact_id: Option<String>,
    lead_id: Option<String>,
    thread_id: Option<String>,
    status: String,
    next_action_at: String,
    completed_steps: String,
    customizations: String,
    personalized_content: String,
    created_at: String,
    updated_at: String,
}

fn row_to_execution(row: ExecutionRow) -> DomainResult<FollowUpExecution> {
    let completed_steps: Vec<u32> = serde_json::from_str(&row.completed_steps)
        .map_err(|e| DomainError::SerializationError(format!("completed_steps: {}", e)))?;
    let customizations: HashMap<String, serde_json::Value> =
        serde_json::from_str(&row.customizations)
            .map_err(|e| DomainError::SerializationError(format!("customizations: {}", e)))?;
    let personalized_content: HashMap<u32, String> =
        serde_json::from_str(&row.personalized_content)
            .map_err(|e| DomainError::SerializationError(format!("personalized_content: {}", e)))?;

    Ok(FollowUpExecution {
        id: parse_uuid(&row.id)?,
        org_id: parse_uuid(&row.org_id)?,
        sequence_id: parse_uuid(&row.sequence_id)?,
        target: FollowUpTarget {
            contact_id: parse_optional_uuid(row.contact_id)?,
            lead_id: parse_optional_uuid(row.lead_id)?,
            thread_id: parse_optional_uuid(row.thread_id)?,
        },
        status: ExecutionStatus::from_str(&row.status).unwrap_or(ExecutionStatus::Active),
        next_action_at: parse_datetime(&row.next_action_at)?,
        completed_steps,
        customizations,
        personalized_content,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[async_trait]
impl ExecutionRepository for SqliteExecutionRepository {
    async fn create_if_absent(
        &self,
        execution: &FollowUpExecution,
    ) -> DomainResult<ExecutionInsert> {
        let completed_steps = serde_json::to_string(&execution.completed_steps)?;
        let customizations = serde_json::to_string(&execution.customizations)?;
        let personalized_content = serde_json::to_string(&execution.personalized_content)?;

        let result = sqlx::query(
            "INSERT INTO follow_up_executions
             (id, org_id, sequence_id, contact_id, lead_id, thread_id,
              status, next_action_at, completed_steps, customizations,
              personalized_content, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(execution.id.to_string())
        .bind(execution.org_id.to_string())
        .bind(execution.sequence_id.to_string())
        .bind(execution.target.contact_id.map(|u| u.to_string()))
        .bind(execution.target.lead_id.map(|u| u.to_string()))
        .bind(execution.target.thread_id.map(|u| u.to_string()))
        .bind(execution.status.as_str())
        .bind(format_datetime(execution.next_action_at))
        .bind(&completed_steps)
        .bind(&customizations)
        .bind(&personalized_content)
        .bind(format_datetime(execution.created_at))
        .bind(format_datetime(execution.updated_at))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(ExecutionInsert::Created),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                match self.find_active_for_tuple(execution).await? {
                    Some(existing) => Ok(ExecutionInsert::DuplicateActive { existing }),
                    // The winner finished between our insert and re-query.
                    None => Err(DomainError::DatabaseError(db_err.to_string())),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn get(&self, id: Uuid) -> DomainResult<Option<FollowUpExecution>> {
        let row: Option<ExecutionRow> =
            sqlx::query_as("SELECT * FROM follow_up_executions WHERE id = ?1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(row_to_execution).transpose()
    }

    async fn update(&self, execution: &FollowUpExecution) -> DomainResult<()> {
        let completed_steps = serde_json::to_string(&execution.completed_steps)?;
        let customizations = serde_json::to_string(&execution.customizations)?;
        let personalized_content = serde_json::to_string(&execution.personalized_content)?;

        let result = sqlx::query(
            "UPDATE follow_up_executions SET
                status = ?2, next_action_at = ?3, completed_steps = ?4,
                customizations = ?5, personalized_content = ?6, updated_at = ?7
             WHERE id = ?1",
        )
        .bind(execution.id.to_string())
        .bind(execution.status.as_str())
        .bind(format_datetime(execution.next_action_at))
        .bind(&completed_steps)
        .bind(&customizations)
        .bind(&personalized_content)
        .bind(format_datetime(execution.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::ExecutionNotFound(execution.id));
        }
        Ok(())
    }

    async fn list_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> DomainResult<Vec<FollowUpExecution>> {
        let rows: Vec<ExecutionRow> = sqlx::query_as(
            "SELECT * FROM follow_up_executions
             WHERE status = 'active' AND next_action_at <= ?1
             ORDER BY next_action_at
             LIMIT ?2",
        )
        .bind(format_datetime(now))
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_execution).collect()
    }
}
