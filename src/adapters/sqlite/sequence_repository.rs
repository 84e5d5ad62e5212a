//! SQLite adapter for SequenceRepository.

use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::adapters::sqlite::{format_datetime, parse_datetime, parse_uuid};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Conditions, Sequence, SequenceStep};
use crate::domain::ports::{SequenceFilter, SequenceRepository};

#[derive(Clone)]
pub struct SqliteSequenceRepository {
    pool: SqlitePool,
}

impl SqliteSequenceRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct SequenceRow {
    id: String,
    org_id: String,
    name: String,
    description: String,
    sequence_type: String,
    trigger_event: String,
    steps: String,
    conditions: String,
    active: i64,
    created_at: String,
    updated_at: String,
}

fn row_to_sequence(row: SequenceRow) -> DomainResult<Sequence> {
    let steps: Vec<SequenceStep> = serde_json::from_str(&row.steps)
        .map_err(|e| DomainError::SerializationError(format!("steps: {}", e)))?;
    let conditions: Conditions = serde_json::from_str(&row.conditions)
        .map_err(|e| DomainError::SerializationError(format!("conditions: {}", e)))?;

    Ok(Sequence {
        id: parse_uuid(&row.id)?,
        org_id: parse_uuid(&row.org_id)?,
        name: row.name,
        description: row.description,
        sequence_type: row.sequence_type,
        trigger_event: row.trigger_event,
        steps,
        conditions,
        active: row.active != 0,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

#[async_trait]
impl SequenceRepository for SqliteSequenceRepository {
    async fn create(&self, sequence: &Sequence) -> DomainResult<()> {
        let steps = serde_json::to_string(&sequence.steps)?;
        let conditions = serde_json::to_string(&sequence.conditions)?;

        sqlx::query(
            "INSERT INTO sequences
             (id, org_id, name, description, sequence_type, trigger_event,
              steps, conditions, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(sequence.id.to_string())
        .bind(sequence.org_id.to_string())
        .bind(&sequence.name)
        .bind(&sequence.description)
        .bind(&sequence.sequence_type)
        .bind(&sequence.trigger_event)
        .bind(&steps)
        .bind(&conditions)
        .bind(i64::from(sequence.active))
        .bind(format_datetime(sequence.created_at))
        .bind(format_datetime(sequence.updated_at))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomainResult<Option<Sequence>> {
        let row: Option<SequenceRow> =
            sqlx::query_as("SELECT * FROM sequences WHERE org_id = ?1 AND id = ?2")
                .bind(org_id.to_string())
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(row_to_sequence).transpose()
    }

    async fn update(&self, sequence: &Sequence) -> DomainResult<()> {
        let steps = serde_json::to_string(&sequence.steps)?;
        let conditions = serde_json::to_string(&sequence.conditions)?;

        let result = sqlx::query(
            "UPDATE sequences SET
                name = ?3, description = ?4, sequence_type = ?5,
                trigger_event = ?6, steps = ?7, conditions = ?8,
                active = ?9, updated_at = ?10
             WHERE org_id = ?1 AND id = ?2",
        )
        .bind(sequence.org_id.to_string())
        .bind(sequence.id.to_string())
        .bind(&sequence.name)
        .bind(&sequence.description)
        .bind(&sequence.sequence_type)
        .bind(&sequence.trigger_event)
        .bind(&steps)
        .bind(&conditions)
        .bind(i64::from(sequence.active))
        .bind(format_datetime(sequence.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::SequenceNotFound(sequence.id));
        }
        Ok(())
    }

    async fn list(&self, org_id: Uuid, filter: &SequenceFilter) -> DomainResult<Vec<Sequence>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM sequences WHERE org_id = ");
        qb.push_bind(org_id.to_string());

        if let Some(active) = filter.active {
            qb.push(" AND active = ").push_bind(i64::from(active));
        }
        if let Some(trigger_event) = &filter.trigger_event {
            qb.push(" AND trigger_event = ")
                .push_bind(trigger_event.clone());
        }
        qb.push(" ORDER BY created_at");

        let rows: Vec<SequenceRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_sequence).collect()
    }

    async fn list_active_by_trigger(
        &self,
        org_id: Uuid,
        trigger_event: &str,
    ) -> DomainResult<Vec<Sequence>> {
        let rows: Vec<SequenceRow> = sqlx::query_as(
            "SELECT * FROM sequences
             WHERE org_id = ?1 AND trigger_event = ?2 AND active = 1
             ORDER BY created_at",
        )
        .bind(org_id.to_string())
        .bind(trigger_event)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(row_to_sequence).collect()
    }
}
