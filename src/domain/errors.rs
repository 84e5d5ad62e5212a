//! Domain errors for the Cadence scheduling engine.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use super::models::appointment::Appointment;

/// Detail payload for a scheduling conflict: the colliding appointments plus
/// up to three alternative start times the caller can offer instead.
#[derive(Debug, Clone)]
pub struct SchedulingConflict {
    pub conflicts: Vec<Appointment>,
    pub suggestions: Vec<DateTime<Utc>>,
}

/// Domain-level errors that can occur in the Cadence system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Appointment not found: {0}")]
    AppointmentNotFound(Uuid),

    #[error("Sequence not found: {0}")]
    SequenceNotFound(Uuid),

    #[error("Reminder not found: {0}")]
    ReminderNotFound(Uuid),

    #[error("Execution not found: {0}")]
    ExecutionNotFound(Uuid),

    #[error("No sequence or built-in template for trigger event '{0}'")]
    UnknownTriggerEvent(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Scheduling conflict with {} existing appointment(s)", .0.conflicts.len())]
    SchedulingConflict(Box<SchedulingConflict>),

    #[error("An active execution already exists for this sequence and target: {existing}")]
    DuplicateExecution { existing: Uuid },

    #[error("Dispatch failed: {0}")]
    DispatchFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
