//! Reminder work items derived from appointments.
//!
//! Each appointment fans out into up to three reminders at fixed offsets
//! before its start. A reminder whose trigger instant is already in the past
//! at scheduling time is dropped, not created.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How far ahead of the appointment start the reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    TwentyFourHour,
    TwoHour,
    ThirtyMinute,
}

impl ReminderKind {
    /// All kinds, largest offset first.
    pub const ALL: [ReminderKind; 3] = [Self::TwentyFourHour, Self::TwoHour, Self::ThirtyMinute];

    /// Offset subtracted from the appointment start to get the trigger instant.
    pub fn offset(&self) -> Duration {
        match self {
            Self::TwentyFourHour => Duration::hours(24),
            Self::TwoHour => Duration::hours(2),
            Self::ThirtyMinute => Duration::minutes(30),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwentyFourHour => "24_hour",
            Self::TwoHour => "2_hour",
            Self::ThirtyMinute => "30_minute",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "24_hour" => Some(Self::TwentyFourHour),
            "2_hour" => Some(Self::TwoHour),
            "30_minute" => Some(Self::ThirtyMinute),
            _ => None,
        }
    }
}

/// A schedulable reminder awaiting dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReminderWorkItem {
    pub id: Uuid,
    pub org_id: Uuid,
    pub appointment_id: Uuid,
    pub kind: ReminderKind,
    /// When the reminder becomes due (= appointment start − kind offset).
    pub trigger_at: DateTime<Utc>,
    /// Set once the external dispatcher has taken the reminder.
    pub dispatched_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ReminderWorkItem {
    pub fn new(
        org_id: Uuid,
        appointment_id: Uuid,
        kind: ReminderKind,
        trigger_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            appointment_id,
            kind,
            trigger_at,
            dispatched_at: None,
            created_at: now,
        }
    }
}
