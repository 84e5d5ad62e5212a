//! Downstream signals emitted after appointment state changes.
//!
//! Invoked fire-and-forget by the appointment service: a hook failure is
//! logged and never fails the operation that raised it.

use async_trait::async_trait;

use super::action_dispatcher::DispatchError;
use crate::domain::models::Appointment;

#[async_trait]
pub trait AppointmentHooks: Send + Sync {
    /// Called after an appointment is created in (or moved to) `confirmed`
    /// status. Typical wiring starts follow-up automation here.
    async fn appointment_confirmed(&self, appointment: &Appointment) -> Result<(), DispatchError>;
}

/// A no-op hooks implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHooks;

#[async_trait]
impl AppointmentHooks for NullHooks {
    async fn appointment_confirmed(&self, appointment: &Appointment) -> Result<(), DispatchError> {
        tracing::debug!(appointment_id = %appointment.id, "appointment confirmed (null hooks)");
        Ok(())
    }
}
