//! Built-in sequence templates keyed by trigger event.
//!
//! When smart triggering finds no sequence registered for an event, it
//! synthesizes one from this catalog. The catalog is a registry injected at
//! engine construction, so new event types can be added without touching
//! engine logic.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::models::{Sequence, SequenceStep, StepAction};

/// A step blueprint within a template.
#[derive(Debug, Clone)]
pub struct StepTemplate {
    pub delay: &'static str,
    pub action: StepAction,
    pub content: &'static str,
    pub subject: Option<&'static str>,
}

/// A named default sequence for one trigger event.
#[derive(Debug, Clone)]
pub struct SequenceTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub steps: Vec<StepTemplate>,
}

/// Registry of default sequence templates.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: HashMap<String, SequenceTemplate>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TemplateCatalog {
    /// The catalog of shipped defaults.
    pub fn builtin() -> Self {
        let mut templates = HashMap::new();

        templates.insert(
            "lead_created".to_string(),
            SequenceTemplate {
                name: "New Lead Nurturing",
                description: "Welcome and qualify a freshly captured lead",
                steps: vec![
                    StepTemplate {
                        delay: "15 minutes",
                        action: StepAction::SendEmail,
                        subject: Some("Thanks for reaching out"),
                        content: "Hi there, thanks for your interest! I'd love to learn more \
                                  about what you're looking for. Are you searching in a \
                                  particular neighborhood or price range?",
                    },
                    StepTemplate {
                        delay: "2 days",
                        action: StepAction::SendEmail,
                        subject: Some("Still searching?"),
                        content: "Hi there, just checking in. New listings come on the market \
                                  every day and I'm happy to set up a tailored search for you.",
                    },
                ],
            },
        );

        templates.insert(
            "email_received".to_string(),
            SequenceTemplate {
                name: "Email Reply Follow-Up",
                description: "Keep the conversation alive after an inbound email",
                steps: vec![
                    StepTemplate {
                        delay: "1 hour",
                        action: StepAction::SendEmail,
                        subject: Some("Re: your message"),
                        content: "Hi there, thanks for your message. I'm looking into it and \
                                  will get back to you shortly with details.",
                    },
                    StepTemplate {
                        delay: "1 day",
                        action: StepAction::CreateTask,
                        subject: None,
                        content: "Reply personally to the inbound email if not yet handled.",
                    },
                ],
            },
        );

        templates.insert(
            "appointment_completed".to_string(),
            SequenceTemplate {
                name: "Post-Appointment Follow-Up",
                description: "Thank the client after a showing or meeting and keep momentum",
                steps: vec![
                    StepTemplate {
                        delay: "2 hours",
                        action: StepAction::SendEmail,
                        subject: Some("Great meeting you today"),
                        content: "Hi there, thank you for your time today! Let me know what \
                                  you thought and whether you'd like to see anything else.",
                    },
                    StepTemplate {
                        delay: "3 days",
                        action: StepAction::CreateTask,
                        subject: None,
                        content: "Call to collect feedback from the recent appointment.",
                    },
                ],
            },
        );

        Self { templates }
    }

    /// An empty catalog, for deployments that only use explicit sequences.
    pub fn empty() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register or replace a template for an event.
    pub fn with_template(mut self, trigger_event: impl Into<String>, template: SequenceTemplate) -> Self {
        self.templates.insert(trigger_event.into(), template);
        self
    }

    pub fn get(&self, trigger_event: &str) -> Option<&SequenceTemplate> {
        self.templates.get(trigger_event)
    }

    /// Materialize the default sequence for an event, if the catalog has one.
    pub fn synthesize(
        &self,
        org_id: Uuid,
        trigger_event: &str,
        now: DateTime<Utc>,
    ) -> Option<Sequence> {
        let template = self.get(trigger_event)?;
        let steps = template
            .steps
            .iter()
            .enumerate()
            .map(|(idx, step)| SequenceStep {
                step_number: u32::try_from(idx).unwrap_or(u32::MAX) + 1,
                delay: step.delay.to_string(),
                action: step.action,
                content: step.content.to_string(),
                subject: step.subject.map(str::to_string),
                conditions: None,
                personalize: true,
            })
            .collect();

        Some(
            Sequence::new(org_id, template.name, trigger_event, steps, now)
                .with_description(template.description),
        )
    }
}
