//! Outbound action dispatch.
//!
//! The engine emits due actions (messages, tasks, reminders) through this
//! port; delivery guarantees, channels, and retries beyond the poller's
//! backoff are the dispatcher's concern.

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::models::{FollowUpTarget, ReminderKind};

#[derive(Debug, Error)]
#[error("dispatch failed: {0}")]
pub struct DispatchError(pub String);

/// A concrete action ready for delivery.
#[derive(Debug, Clone)]
pub enum DispatchAction {
    SendEmail {
        subject: Option<String>,
        body: String,
    },
    SendSms {
        body: String,
    },
    CreateTask {
        title: String,
        details: String,
    },
    ScheduleCall {
        notes: String,
    },
    /// An appointment reminder that has come due.
    AppointmentReminder {
        appointment_id: Uuid,
        kind: ReminderKind,
    },
}

/// Routing envelope around a dispatchable action.
#[derive(Debug, Clone)]
pub struct DispatchEnvelope {
    pub org_id: Uuid,
    pub target: FollowUpTarget,
    pub action: DispatchAction,
}

#[async_trait]
pub trait ActionDispatcher: Send + Sync {
    async fn dispatch(&self, envelope: DispatchEnvelope) -> Result<(), DispatchError>;
}

/// A no-op dispatcher that logs and drops every action.
///
/// Used when no delivery backend is wired up but the type system requires an
/// `ActionDispatcher` implementation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDispatcher;

#[async_trait]
impl ActionDispatcher for NullDispatcher {
    async fn dispatch(&self, envelope: DispatchEnvelope) -> Result<(), DispatchError> {
        tracing::debug!(org_id = %envelope.org_id, action = ?envelope.action, "dropping action (null dispatcher)");
        Ok(())
    }
}
