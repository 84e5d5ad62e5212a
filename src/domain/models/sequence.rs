//! Follow-up sequence domain model.
//!
//! A Sequence is a reusable, named template of ordered steps fired by a
//! trigger event (e.g. `lead_created`). Each step carries a human-readable
//! delay, an action kind, and content to send or enqueue. The actual
//! per-target progress lives in a `FollowUpExecution`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::conditions::Conditions;
use crate::domain::errors::{DomainError, DomainResult};

/// The action a step performs when it becomes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    SendEmail,
    SendSms,
    CreateTask,
    ScheduleCall,
}

impl StepAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SendEmail => "send_email",
            Self::SendSms => "send_sms",
            Self::CreateTask => "create_task",
            Self::ScheduleCall => "schedule_call",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "send_email" => Some(Self::SendEmail),
            "send_sms" => Some(Self::SendSms),
            "create_task" => Some(Self::CreateTask),
            "schedule_call" => Some(Self::ScheduleCall),
            _ => None,
        }
    }
}

/// One unit of a sequence: a delay, an action, and content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceStep {
    /// 1-based, dense within the owning sequence.
    pub step_number: u32,
    /// Human-readable delay such as "2 days" or "15 minutes".
    pub delay: String,
    pub action: StepAction,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,
    /// Whether the content is rewritten per-target before dispatch.
    #[serde(default = "default_personalize")]
    pub personalize: bool,
}

fn default_personalize() -> bool {
    true
}

impl SequenceStep {
    /// Step delay converted to minutes.
    pub fn delay_minutes(&self) -> i64 {
        parse_delay_minutes(&self.delay)
    }
}

/// A reusable follow-up template owned by an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub description: String,
    pub sequence_type: String,
    /// Free-form event tag that starts this sequence, e.g. `lead_created`.
    pub trigger_event: String,
    pub steps: Vec<SequenceStep>,
    /// Top-level match conditions checked by smart triggering.
    #[serde(default)]
    pub conditions: Conditions,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Sequence {
    pub fn new(
        org_id: Uuid,
        name: impl Into<String>,
        trigger_event: impl Into<String>,
        steps: Vec<SequenceStep>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            name: name.into(),
            description: String::new(),
            sequence_type: "follow_up".to_string(),
            trigger_event: trigger_event.into(),
            steps,
            conditions: Conditions::default(),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_conditions(mut self, conditions: Conditions) -> Self {
        self.conditions = conditions;
        self
    }

    pub fn step(&self, step_number: u32) -> Option<&SequenceStep> {
        self.steps.iter().find(|s| s.step_number == step_number)
    }

    /// Reject malformed sequences at creation time: step numbers must be
    /// contiguous starting at 1, and every step needs delay and content.
    pub fn validate(&self) -> DomainResult<()> {
        if self.steps.is_empty() {
            return Err(DomainError::ValidationFailed(
                "sequence must have at least one step".to_string(),
            ));
        }
        for (idx, step) in self.steps.iter().enumerate() {
            let expected = u32::try_from(idx).unwrap_or(u32::MAX) + 1;
            if step.step_number != expected {
                return Err(DomainError::ValidationFailed(format!(
                    "step numbers must be contiguous from 1; found {} at position {}",
                    step.step_number, expected
                )));
            }
            if step.delay.trim().is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "step {} is missing a delay",
                    step.step_number
                )));
            }
            if step.content.trim().is_empty() {
                return Err(DomainError::ValidationFailed(format!(
                    "step {} is missing content",
                    step.step_number
                )));
            }
        }
        Ok(())
    }
}

/// Parse a human delay string (`"2 days"`, `"15 minutes"`, `"1 week"`) into
/// minutes. Unparseable input resolves to 0 (immediate); parsing is total.
pub fn parse_delay_minutes(delay: &str) -> i64 {
    let mut parts = delay.split_whitespace();
    let (Some(amount), Some(unit)) = (parts.next(), parts.next()) else {
        return 0;
    };
    let Ok(amount) = amount.parse::<i64>() else {
        return 0;
    };
    let unit = unit.to_lowercase();
    let unit = unit.strip_suffix('s').unwrap_or(&unit);
    let multiplier = match unit {
        "minute" | "min" => 1,
        "hour" => 60,
        "day" => 1440,
        "week" => 10080,
        _ => return 0,
    };
    amount * multiplier
}
