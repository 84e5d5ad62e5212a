//! Declarative match conditions for sequences and steps.
//!
//! A persistable filter evaluated against a target snapshot. Recognized keys
//! are `lead_stage`, `contact_tags`, and `time_of_day`; anything else in a
//! stored document is ignored. An empty condition set always matches.

use serde::{Deserialize, Serialize};

/// Inclusive hour-of-day window, 0-23.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDayWindow {
    pub start: u32,
    pub end: u32,
}

impl TimeOfDayWindow {
    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.start && hour <= self.end
    }
}

/// Declarative conditions ANDed together at evaluation time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conditions {
    /// Required exact lead stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_stage: Option<String>,
    /// Tags that must all be present on the contact.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contact_tags: Vec<String>,
    /// Hour window the current local time must fall within.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDayWindow>,
}

impl Conditions {
    /// True when no recognized key is present; empty conditions match.
    pub fn is_empty(&self) -> bool {
        self.lead_stage.is_none() && self.contact_tags.is_empty() && self.time_of_day.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_conditions() {
        assert!(Conditions::default().is_empty());

        let c = Conditions {
            lead_stage: Some("qualified".to_string()),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }

    #[test]
    fn test_unrecognized_keys_ignored() {
        let c: Conditions =
            serde_json::from_str(r#"{"lead_stage":"new","minimum_budget":500000}"#).unwrap();
        assert_eq!(c.lead_stage.as_deref(), Some("new"));
        assert!(c.contact_tags.is_empty());
    }

    #[test]
    fn test_time_window_inclusive() {
        let w = TimeOfDayWindow { start: 9, end: 17 };
        assert!(w.contains(9));
        assert!(w.contains(17));
        assert!(!w.contains(18));
        assert!(!w.contains(8));
    }
}
