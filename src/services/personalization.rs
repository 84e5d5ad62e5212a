//! Per-target rewriting of outgoing template content.
//!
//! Two independent rewrites:
//! 1. A greeting token (`Hi`, `Hello`, `Dear`, optionally followed by a
//!    comma) at the start of a line becomes `Hi <FirstName>, ` when a real
//!    contact name is known.
//! 2. `{{variable}}` placeholders are substituted from the caller-supplied
//!    map (case-insensitive key match); unresolved placeholders stay as-is.
//!
//! CRM lookup failures degrade to a neutral label and are logged, never
//! propagated.

use std::collections::HashMap;
use std::sync::Arc;

use regex::{Captures, Regex};
use serde_json::Value;
use tracing::{trace, warn};
use uuid::Uuid;

use crate::domain::models::{Contact, FollowUpTarget, Lead};
use crate::domain::ports::CrmLookup;

/// Label used when no contact can be resolved.
const FALLBACK_LABEL: &str = "valued client";

pub struct PersonalizationEngine<L: CrmLookup> {
    crm: Arc<L>,
    greeting_re: Regex,
    placeholder_re: Regex,
}

impl<L: CrmLookup> PersonalizationEngine<L> {
    pub fn new(crm: Arc<L>) -> Self {
        Self {
            crm,
            greeting_re: Regex::new(r"(?mi)^(?:hi|hello|dear)(?:\s+there)?\b\s*,?[ \t]*")
                .expect("greeting pattern is valid"),
            placeholder_re: Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}")
                .expect("placeholder pattern is valid"),
        }
    }

    /// Rewrite a template for one target.
    pub async fn personalize(
        &self,
        template: &str,
        org_id: Uuid,
        target: &FollowUpTarget,
        variables: &HashMap<String, Value>,
    ) -> String {
        let contact = self.resolve_contact(org_id, target).await;
        let lead = self.resolve_lead(org_id, target).await;

        trace!(
            org_id = %org_id,
            summary = %context_summary(contact.as_ref(), lead.as_ref()),
            "personalizing template"
        );

        let mut content = template.to_string();

        if let Some(first_name) = contact
            .as_ref()
            .map(|c| c.first_name.trim())
            .filter(|n| !n.is_empty())
        {
            let greeting = format!("Hi {first_name}, ");
            content = self
                .greeting_re
                .replace_all(&content, greeting.as_str())
                .into_owned();
        }

        self.placeholder_re
            .replace_all(&content, |caps: &Captures<'_>| {
                let key = &caps[1];
                match lookup_variable(variables, key) {
                    Some(value) => value,
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    async fn resolve_contact(&self, org_id: Uuid, target: &FollowUpTarget) -> Option<Contact> {
        let contact_id = target.contact_id?;
        match self.crm.get_contact(org_id, contact_id).await {
            Ok(contact) => contact,
            Err(err) => {
                warn!(contact_id = %contact_id, error = %err, "contact lookup failed; using fallback");
                None
            }
        }
    }

    async fn resolve_lead(&self, org_id: Uuid, target: &FollowUpTarget) -> Option<Lead> {
        let lead_id = target.lead_id?;
        match self.crm.get_lead(org_id, lead_id).await {
            Ok(lead) => lead,
            Err(err) => {
                warn!(lead_id = %lead_id, error = %err, "lead lookup failed; skipping lead context");
                None
            }
        }
    }
}

/// One-line summary of what is known about the target.
pub fn context_summary(contact: Option<&Contact>, lead: Option<&Lead>) -> String {
    let name = contact
        .map(Contact::display_name)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_LABEL.to_string());

    let mut summary = format!("Contact: {name}");
    if let Some(lead) = lead {
        if let Some(title) = &lead.title {
            summary.push_str(&format!(", lead: {title}"));
        }
        summary.push_str(&format!(", stage: {}", lead.stage));
        if let Some(value) = lead.value {
            summary.push_str(&format!(", value: ${value:.0}"));
        }
    }
    summary
}

/// Case-insensitive variable lookup; JSON strings substitute verbatim,
/// other values via their JSON rendering.
fn lookup_variable(variables: &HashMap<String, Value>, key: &str) -> Option<String> {
    let (_, value) = variables
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))?;
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    use crate::domain::ports::LookupError;

    struct FakeCrm {
        contact: Option<Contact>,
        lead: Option<Lead>,
        failing: bool,
    }

    #[async_trait]
    impl CrmLookup for FakeCrm {
        async fn get_contact(&self, _org: Uuid, _id: Uuid) -> Result<Option<Contact>, LookupError> {
            if self.failing {
                return Err(LookupError("timeout".to_string()));
            }
            Ok(self.contact.clone())
        }

        async fn get_lead(&self, _org: Uuid, _id: Uuid) -> Result<Option<Lead>, LookupError> {
            if self.failing {
                return Err(LookupError("timeout".to_string()));
            }
            Ok(self.lead.clone())
        }
    }

    fn maria() -> Contact {
        Contact {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            first_name: "Maria".to_string(),
            last_name: "Lopez".to_string(),
            email: Some("maria@example.com".to_string()),
            tags: vec![],
        }
    }

    fn engine(crm: FakeCrm) -> PersonalizationEngine<FakeCrm> {
        PersonalizationEngine::new(Arc::new(crm))
    }

    fn target_with_contact() -> FollowUpTarget {
        FollowUpTarget::contact(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_greeting_rewritten_with_first_name() {
        let engine = engine(FakeCrm {
            contact: Some(maria()),
            lead: None,
            failing: false,
        });
        let out = engine
            .personalize(
                "Hi there, are you still looking?",
                Uuid::new_v4(),
                &target_with_contact(),
                &HashMap::new(),
            )
            .await;
        assert_eq!(out, "Hi Maria, are you still looking?");
    }

    #[tokio::test]
    async fn test_hello_and_dear_also_rewritten() {
        let engine = engine(FakeCrm {
            contact: Some(maria()),
            lead: None,
            failing: false,
        });
        for template in ["Hello, quick update.", "Dear client, quick update."] {
            let out = engine
                .personalize(
                    template,
                    Uuid::new_v4(),
                    &target_with_contact(),
                    &HashMap::new(),
                )
                .await;
            assert!(out.starts_with("Hi Maria, "), "got: {out}");
        }
    }

    #[tokio::test]
    async fn test_greeting_untouched_without_contact() {
        let engine = engine(FakeCrm {
            contact: None,
            lead: None,
            failing: false,
        });
        let out = engine
            .personalize(
                "Hi there, checking in.",
                Uuid::new_v4(),
                &target_with_contact(),
                &HashMap::new(),
            )
            .await;
        assert_eq!(out, "Hi there, checking in.");
    }

    #[tokio::test]
    async fn test_placeholder_substitution_case_insensitive() {
        let engine = engine(FakeCrm {
            contact: None,
            lead: None,
            failing: false,
        });
        let mut vars = HashMap::new();
        vars.insert("Property".to_string(), json!("12 Oak St"));
        vars.insert("price".to_string(), json!(450000));
        let out = engine
            .personalize(
                "Re: {{property}} listed at {{PRICE}}. {{unknown}} stays.",
                Uuid::new_v4(),
                &FollowUpTarget::default(),
                &vars,
            )
            .await;
        assert_eq!(out, "Re: 12 Oak St listed at 450000. {{unknown}} stays.");
    }

    #[tokio::test]
    async fn test_lookup_failure_degrades_gracefully() {
        let engine = engine(FakeCrm {
            contact: None,
            lead: None,
            failing: true,
        });
        let out = engine
            .personalize(
                "Hi there, checking in.",
                Uuid::new_v4(),
                &target_with_contact(),
                &HashMap::new(),
            )
            .await;
        assert_eq!(out, "Hi there, checking in.");
    }

    #[test]
    fn test_context_summary_fallback_label() {
        assert_eq!(context_summary(None, None), "Contact: valued client");
    }

    #[test]
    fn test_context_summary_with_lead() {
        let lead = Lead {
            id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            title: Some("3BR in Maplewood".to_string()),
            stage: "qualified".to_string(),
            value: Some(450_000.0),
            contact_id: None,
        };
        let summary = context_summary(Some(&maria()), Some(&lead));
        assert_eq!(
            summary,
            "Contact: Maria Lopez, lead: 3BR in Maplewood, stage: qualified, value: $450000"
        );
    }
}
