//! Appointment domain model.
//!
//! An Appointment is a booked time window owned by an organization,
//! optionally tied to a CRM contact, lead, or originating message thread.
//! Cancellation is a status transition; appointments are never hard-deleted.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of appointment being booked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentType {
    /// Property showing.
    Showing,
    /// In-person or video meeting.
    Meeting,
    /// Phone call.
    Call,
    Other,
}

impl AppointmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Showing => "showing",
            Self::Meeting => "meeting",
            Self::Call => "call",
            Self::Other => "other",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "showing" => Some(Self::Showing),
            "meeting" => Some(Self::Meeting),
            "call" => Some(Self::Call),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

/// Appointment lifecycle status.
///
/// Transitions are deliberately permissive: any of the four states may be set
/// via update, with `completed` and `cancelled` recording their instants.
/// There is no transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked but awaiting confirmation.
    Pending,
    /// Confirmed by the organization or the attendee.
    Confirmed,
    /// Took place.
    Completed,
    /// Called off; the record is retained.
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Whether the status still occupies its time slot for conflict checks.
    pub fn blocks_slot(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// A booked appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub org_id: Uuid,
    pub appointment_type: AppointmentType,
    /// Scheduled start. Must be strictly in the future at creation time.
    pub scheduled_at: DateTime<Utc>,
    /// Duration in minutes, > 0.
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub property_address: Option<String>,
    /// Attendee email addresses.
    pub attendees: Vec<String>,
    /// Free-form requirements text from the requester.
    pub requirements: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,

    // -- Weak references into the CRM --
    pub contact_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub thread_id: Option<Uuid>,

    // -- Opaque tokens, generated once at creation, immutable --
    pub confirmation_token: String,
    pub reschedule_token: String,

    // -- Status bookkeeping --
    pub completed_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancellation_reason: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Exclusive end of the appointment window.
    pub fn end_time(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_minutes)
    }
}

/// Request payload for booking an appointment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAppointmentRequest {
    pub org_id: Uuid,
    pub appointment_type: AppointmentType,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i64,
    pub location: Option<String>,
    pub property_address: Option<String>,
    #[serde(default)]
    pub attendees: Vec<String>,
    pub requirements: Option<String>,
    pub contact_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub thread_id: Option<Uuid>,
    /// When set, the appointment is created directly in `confirmed` status.
    #[serde(default)]
    pub auto_confirm: bool,
}

fn default_duration() -> i64 {
    60
}

/// Partial update applied to an existing appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppointmentPatch {
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
    /// Recorded when the patch cancels the appointment.
    pub cancellation_reason: Option<String>,
}

/// Query filters for listing appointments within an organization.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilters {
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<AppointmentType>,
    pub contact_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}
