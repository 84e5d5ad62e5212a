//! Appointment booking, updates, and listing with insights.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult, SchedulingConflict};
use crate::domain::models::{
    Appointment, AppointmentFilters, AppointmentPatch, AppointmentStatus,
    CreateAppointmentRequest,
};
use crate::domain::ports::{
    AppointmentHooks, AppointmentInsert, AppointmentRepository, Clock, ReminderRepository,
    TokenGenerator,
};
use crate::services::conflict_resolver::ConflictResolver;
use crate::services::insights::{compute_insights, summarize, AppointmentInsights, AppointmentSummary};
use crate::services::reminder_scheduler::ReminderScheduler;

/// Result of a list call: the matching appointments annotated with
/// side-effect-free insights and status counts.
#[derive(Debug, Serialize)]
pub struct AppointmentListing {
    pub appointments: Vec<Appointment>,
    pub insights: AppointmentInsights,
    pub summary: AppointmentSummary,
}

pub struct AppointmentService<A, R, H, C, T>
where
    A: AppointmentRepository,
    R: ReminderRepository,
    H: AppointmentHooks,
    C: Clock,
    T: TokenGenerator,
{
    appointments: Arc<A>,
    resolver: ConflictResolver<A, C>,
    reminder_scheduler: ReminderScheduler<R, C>,
    hooks: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<C>,
}

impl<A, R, H, C, T> AppointmentService<A, R, H, C, T>
where
    A: AppointmentRepository,
    R: ReminderRepository,
    H: AppointmentHooks,
    C: Clock,
    T: TokenGenerator,
{
    pub fn new(
        appointments: Arc<A>,
        reminders: Arc<R>,
        hooks: Arc<H>,
        tokens: Arc<T>,
        clock: Arc<C>,
    ) -> Self {
        Self {
            resolver: ConflictResolver::new(Arc::clone(&appointments), Arc::clone(&clock)),
            reminder_scheduler: ReminderScheduler::new(reminders, Arc::clone(&clock)),
            appointments,
            hooks,
            tokens,
            clock,
        }
    }

    pub fn resolver(&self) -> &ConflictResolver<A, C> {
        &self.resolver
    }

    /// Book an appointment.
    ///
    /// Returns `SchedulingConflict` (with the colliding appointments and up
    /// to three free alternatives) when the slot is taken. Reminder creation
    /// and the confirmed-hook are best-effort: their failure is logged and
    /// never rolls back the booking.
    pub async fn create(&self, request: CreateAppointmentRequest) -> DomainResult<Appointment> {
        let now = self.clock.now();

        if request.duration_minutes <= 0 {
            return Err(DomainError::ValidationFailed(
                "duration must be positive".to_string(),
            ));
        }
        if request.scheduled_at <= now {
            return Err(DomainError::ValidationFailed(
                "scheduled time must be in the future".to_string(),
            ));
        }

        let status = if request.auto_confirm {
            AppointmentStatus::Confirmed
        } else {
            AppointmentStatus::Pending
        };

        let appointment = Appointment {
            id: Uuid::new_v4(),
            org_id: request.org_id,
            appointment_type: request.appointment_type,
            scheduled_at: request.scheduled_at,
            duration_minutes: request.duration_minutes,
            location: request.location,
            property_address: request.property_address,
            attendees: request.attendees,
            requirements: request.requirements,
            status,
            notes: None,
            contact_id: request.contact_id,
            lead_id: request.lead_id,
            thread_id: request.thread_id,
            confirmation_token: self.tokens.generate(),
            reschedule_token: self.tokens.generate(),
            completed_at: None,
            cancelled_at: None,
            cancellation_reason: None,
            created_at: now,
            updated_at: now,
        };

        // Conflict check and insert are one atomic repository operation so
        // two concurrent bookings cannot both pass the check.
        match self.appointments.create_if_no_conflict(&appointment).await? {
            AppointmentInsert::Created => {}
            AppointmentInsert::Conflicted(conflicts) => {
                let suggestions = self
                    .resolver
                    .suggest(
                        appointment.org_id,
                        appointment.scheduled_at,
                        appointment.duration_minutes,
                        appointment.property_address.as_deref(),
                    )
                    .await?;
                return Err(DomainError::SchedulingConflict(Box::new(
                    SchedulingConflict {
                        conflicts,
                        suggestions,
                    },
                )));
            }
        }

        if let Err(err) = self.reminder_scheduler.schedule(&appointment).await {
            warn!(appointment_id = %appointment.id, error = %err, "reminder scheduling failed");
        }

        if appointment.status == AppointmentStatus::Confirmed {
            if let Err(err) = self.hooks.appointment_confirmed(&appointment).await {
                warn!(appointment_id = %appointment.id, error = %err, "confirmed hook failed");
            }
        }

        info!(
            appointment_id = %appointment.id,
            org_id = %appointment.org_id,
            scheduled_at = %appointment.scheduled_at,
            status = appointment.status.as_str(),
            "created appointment"
        );
        Ok(appointment)
    }

    /// Apply a status transition and/or notes to an appointment.
    ///
    /// Transitions are unconditional across the four-state set; `completed`
    /// records its instant, `cancelled` records instant and reason.
    /// Cancelling does not cascade to reminders or follow-up executions.
    pub async fn update(
        &self,
        org_id: Uuid,
        id: Uuid,
        patch: AppointmentPatch,
    ) -> DomainResult<Appointment> {
        let mut appointment = self
            .appointments
            .get(org_id, id)
            .await?
            .ok_or(DomainError::AppointmentNotFound(id))?;

        let now = self.clock.now();
        if let Some(status) = patch.status {
            appointment.status = status;
            match status {
                AppointmentStatus::Completed => appointment.completed_at = Some(now),
                AppointmentStatus::Cancelled => {
                    appointment.cancelled_at = Some(now);
                    appointment.cancellation_reason = patch.cancellation_reason.clone();
                }
                AppointmentStatus::Pending | AppointmentStatus::Confirmed => {}
            }
        }
        if let Some(notes) = patch.notes {
            appointment.notes = Some(notes);
        }
        appointment.updated_at = now;

        self.appointments.update(&appointment).await?;
        Ok(appointment)
    }

    /// List appointments with insights and status counts.
    pub async fn list(
        &self,
        org_id: Uuid,
        filters: &AppointmentFilters,
    ) -> DomainResult<AppointmentListing> {
        let appointments = self.appointments.list(org_id, filters).await?;
        let insights = compute_insights(&appointments, self.clock.now());
        let summary = summarize(&appointments);
        Ok(AppointmentListing {
            appointments,
            insights,
            summary,
        })
    }
}
