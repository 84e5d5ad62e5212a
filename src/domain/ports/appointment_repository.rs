//! Repository contract for appointment persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Appointment, AppointmentFilters};

/// Outcome of the atomic insert-unless-overlapping operation.
///
/// Modeled as a single repository call (rather than a separate read + write)
/// so the storage layer can make the check-then-create race-free.
#[derive(Debug)]
pub enum AppointmentInsert {
    Created,
    /// The insert was refused; the blocking appointments are returned.
    Conflicted(Vec<Appointment>),
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Atomically re-check for overlapping `pending`/`confirmed` appointments
    /// (same org, and same property address when the appointment has one)
    /// and insert only if the window is free.
    async fn create_if_no_conflict(
        &self,
        appointment: &Appointment,
    ) -> DomainResult<AppointmentInsert>;

    async fn get(&self, org_id: Uuid, id: Uuid) -> DomainResult<Option<Appointment>>;

    async fn update(&self, appointment: &Appointment) -> DomainResult<()>;

    /// List appointments for an organization, newest start first.
    async fn list(
        &self,
        org_id: Uuid,
        filters: &AppointmentFilters,
    ) -> DomainResult<Vec<Appointment>>;

    /// Slot-blocking appointments whose window intersects `[start, end)`.
    /// A `property_address` narrows the check to that property.
    async fn find_overlapping(
        &self,
        org_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        property_address: Option<&str>,
    ) -> DomainResult<Vec<Appointment>>;
}
