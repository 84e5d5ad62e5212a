//! Follow-up execution domain model.
//!
//! A FollowUpExecution is the live, per-target instantiation of a Sequence.
//! All temporal behavior is expressed through the persisted `next_action_at`
//! instant; the engine holds no timers. Within one execution, steps run in
//! step-number order because `next_action_at` only ever advances forward.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Execution lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Active,
    Paused,
    Completed,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

/// The contact and/or lead (and optionally message thread) an execution is
/// associated with. At least one of contact or lead identifies the target
/// for the duplicate-execution check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpTarget {
    pub contact_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub thread_id: Option<Uuid>,
}

impl FollowUpTarget {
    pub fn contact(contact_id: Uuid) -> Self {
        Self {
            contact_id: Some(contact_id),
            ..Default::default()
        }
    }

    pub fn lead(lead_id: Uuid) -> Self {
        Self {
            lead_id: Some(lead_id),
            ..Default::default()
        }
    }
}

/// A live instantiation of a sequence for one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowUpExecution {
    pub id: Uuid,
    pub org_id: Uuid,
    pub sequence_id: Uuid,
    pub target: FollowUpTarget,
    pub status: ExecutionStatus,
    /// When the next pending step becomes due. Advances monotonically.
    pub next_action_at: DateTime<Utc>,
    /// Step numbers already dispatched (or skipped by their conditions).
    pub completed_steps: Vec<u32>,
    /// Caller-supplied variables substituted into step content.
    pub customizations: HashMap<String, Value>,
    /// Personalized content per step number, computed eagerly at start.
    pub personalized_content: HashMap<u32, String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowUpExecution {
    pub fn new(
        org_id: Uuid,
        sequence_id: Uuid,
        target: FollowUpTarget,
        customizations: HashMap<String, Value>,
        next_action_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            org_id,
            sequence_id,
            target,
            status: ExecutionStatus::Active,
            next_action_at,
            completed_steps: Vec::new(),
            customizations,
            personalized_content: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_step_completed(&self, step_number: u32) -> bool {
        self.completed_steps.contains(&step_number)
    }

    /// Record a step as done; keeps the set ordered and duplicate-free.
    pub fn mark_step_completed(&mut self, step_number: u32) {
        if !self.is_step_completed(step_number) {
            self.completed_steps.push(step_number);
            self.completed_steps.sort_unstable();
        }
    }

    /// Lowest step number not yet completed, given the sequence's step count.
    pub fn current_step(&self, total_steps: u32) -> Option<u32> {
        (1..=total_steps).find(|n| !self.is_step_completed(*n))
    }
}
