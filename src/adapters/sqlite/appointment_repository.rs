//! SQLite adapter for AppointmentRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::adapters::sqlite::{
    format_datetime, parse_datetime, parse_optional_datetime, parse_optional_uuid, parse_uuid,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Appointment, AppointmentFilters, AppointmentStatus, AppointmentType};
use crate::domain::ports::{AppointmentInsert, AppointmentRepository};

#[derive(Clone)]
pub struct SqliteAppointmentRepository {
    pool: SqlitePool,
}

impl SqliteAppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct AppointmentRow {
    id: String,
    org_id: String,
    appointment_type: String,
    scheduled_at: String,
    #[allow(dead_code)]
    end_at: String,
    duration_minutes: i64,
    location: Option<String>,
    property_address: Option<String>,
    attendees: String,
    requirements: Option<String>,
    status: String,
    notes: Option<String>,
    contact_id: Option<String>,
    lead_id: Option<String>,
    thread_id: Option<String>,
    confirmation_token: String,
    reschedule_token: String,
    completed_at: Option<String>,
    cancelled_at: Option<String>,
    cancellation_reason: Option<String>,
    created_at: String,
    updated_at: String,
}

fn row_to_appointment(row: AppointmentRow) -> DomainResult<Appointment> {
    let attendees: Vec<String> = serde_json::from_str(&row.attendees)
        .map_err(|e| DomainError::SerializationError(format!("attendees: {}", e)))?;

    Ok(Appointment {
        id: parse_uuid(&row.id)?,
        org_id: parse_uuid(&row.org_id)?,
        appointment_type: AppointmentType::from_str(&row.appointment_type)
            .unwrap_or(AppointmentType::Other),
        scheduled_at: parse_datetime(&row.scheduled_at)?,
        duration_minutes: row.duration_minutes,
        location: row.location,
        property_address: row.property_address,
        attendees,
        requirements: row.requirements,
        status: AppointmentStatus::from_str(&row.status).unwrap_or(AppointmentStatus::Pending),
        notes: row.notes,
        contact_id: parse_optional_uuid(row.contact_id)?,
        lead_id: parse_optional_uuid(row.lead_id)?,
        thread_id: parse_optional_uuid(row.thread_id)?,
        confirmation_token: row.confirmation_token,
        reschedule_token: row.reschedule_token,
        completed_at: parse_optional_datetime(row.completed_at)?,
        cancelled_at: parse_optional_datetime(row.cancelled_at)?,
        cancellation_reason: row.cancellation_reason,
        created_at: parse_datetime(&row.created_at)?,
        updated_at: parse_datetime(&row.updated_at)?,
    })
}

const OVERLAP_SQL: &str = "SELECT * FROM appointments
     WHERE org_id = ?1
       AND status IN ('pending', 'confirmed')
       AND scheduled_at < ?3
       AND end_at > ?2
       AND (?4 IS NULL OR property_address = ?4)
     ORDER BY scheduled_at";

const INSERT_SQL: &str = "INSERT INTO appointments
     (id, org_id, appointment_type, scheduled_at, end_at, duration_minutes,
      location, property_address, attendees, requirements, status, notes,
      contact_id, lead_id, thread_id, confirmation_token, reschedule_token,
      completed_at, cancelled_at, cancellation_reason, created_at, updated_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12,
             ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22)";

fn bind_insert<'q>(
    query: sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>>,
    appointment: &'q Appointment,
    attendees_json: &'q str,
) -> sqlx::query::Query<'q, Sqlite, sqlx::sqlite::SqliteArguments<'q>> {
    query
        .bind(appointment.id.to_string())
        .bind(appointment.org_id.to_string())
        .bind(appointment.appointment_type.as_str())
        .bind(format_datetime(appointment.scheduled_at))
        .bind(format_datetime(appointment.end_time()))
        .bind(appointment.duration_minutes)
        .bind(&appointment.location)
        .bind(&appointment.property_address)
        .bind(attendees_json)
        .bind(&appointment.requirements)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.contact_id.map(|u| u.to_string()))
        .bind(appointment.lead_id.map(|u| u.to_string()))
        .bind(appointment.thread_id.map(|u| u.to_string()))
        .bind(&appointment.confirmation_token)
        .bind(&appointment.reschedule_token)
        .bind(appointment.completed_at.map(format_datetime))
        .bind(appointment.cancelled_at.map(format_datetime))
        .bind(&appointment.cancellation_reason)
        .bind(format_datetime(appointment.created_at))
        .bind(format_datetime(appointment.updated_at))
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    async fn create_if_no_conflict(
        &self,
        appointment: &Appointment,
    ) -> DomainResult<AppointmentInsert> {
        let attendees_json = serde_json::to_string(&appointment.attendees)?;

        // Re-check and insert inside one transaction so concurrent bookings
        // cannot both pass the check.
        let mut tx = self.pool.begin().await?;

        let rows: Vec<AppointmentRow> = sqlx::query_as(OVERLAP_SQL)
            .bind(appointment.org_id.to_string())
            .bind(format_datetime(appointment.scheduled_at))
            .bind(format_datetime(appointment.end_time()))
            .bind(&appointment.property_address)
            .fetch_all(&mut *tx)
            .await?;

        if !rows.is_empty() {
            tx.rollback().await?;
            let conflicts = rows
                .into_iter()
                .map(row_to_appointment)
                .collect::<DomainResult<Vec<_>>>()?;
            return Ok(AppointmentInsert::Conflicted(conflicts));
        }

        bind_insert(sqlx::query(INSERT_SQL), appointment, &attendees_json)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(AppointmentInsert::Created)
    }

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomainResult<Option<Appointment>> {
        let row: Option<AppointmentRow> =
            sqlx::query_as("SELECT * FROM appointments WHERE org_id = ?1 AND id = ?2")
                .bind(org_id.to_string())
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await?;
        row.map(row_to_appointment).transpose()
    }

    async fn update(&self, appointment: &Appointment) -> DomainResult<()> {
        let attendees_json = serde_json::to_string(&appointment.attendees)?;
        let result = sqlx::query(
            "UPDATE appointments SET
                appointment_type = ?3, scheduled_at = ?4, end_at = ?5,
                duration_minutes = ?6, location = ?7, property_address = ?8,
                attendees = ?9, requirements = ?10, status = ?11, notes = ?12,
                completed_at = ?13, cancelled_at = ?14, cancellation_reason = ?15,
                updated_at = ?16
             WHERE org_id = ?1 AND id = ?2",
        )
        .bind(appointment.org_id.to_string())
        .bind(appointment.id.to_string())
        .bind(appointment.appointment_type.as_str())
        .bind(format_datetime(appointment.scheduled_at))
        .bind(format_datetime(appointment.end_time()))
        .bind(appointment.duration_minutes)
        .bind(&appointment.location)
        .bind(&appointment.property_address)
        .bind(&attendees_json)
        .bind(&appointment.requirements)
        .bind(appointment.status.as_str())
        .bind(&appointment.notes)
        .bind(appointment.completed_at.map(format_datetime))
        .bind(appointment.cancelled_at.map(format_datetime))
        .bind(&appointment.cancellation_reason)
        .bind(format_datetime(appointment.updated_at))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AppointmentNotFound(appointment.id));
        }
        Ok(())
    }

    async fn list(
        &self,
        org_id: Uuid,
        filters: &AppointmentFilters,
    ) -> DomainResult<Vec<Appointment>> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT * FROM appointments WHERE org_id = ");
        qb.push_bind(org_id.to_string());

        if let Some(status) = filters.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(appointment_type) = filters.appointment_type {
            qb.push(" AND appointment_type = ")
                .push_bind(appointment_type.as_str());
        }
        if let Some(contact_id) = filters.contact_id {
            qb.push(" AND contact_id = ").push_bind(contact_id.to_string());
        }
        if let Some(from) = filters.from {
            qb.push(" AND scheduled_at >= ").push_bind(format_datetime(from));
        }
        if let Some(to) = filters.to {
            qb.push(" AND scheduled_at <= ").push_bind(format_datetime(to));
        }
        qb.push(" ORDER BY scheduled_at DESC");

        let rows: Vec<AppointmentRow> = qb.build_query_as().fetch_all(&self.pool).await?;
        rows.into_iter().map(row_to_appointment).collect()
    }

    async fn find_overlapping(
        &self,
        org_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        property_address: Option<&str>,
    ) -> DomainResult<Vec<Appointment>> {
        let rows: Vec<AppointmentRow> = sqlx::query_as(OVERLAP_SQL)
            .bind(org_id.to_string())
            .bind(format_datetime(start))
            .bind(format_datetime(end))
            .bind(property_address)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(row_to_appointment).collect()
    }
}
