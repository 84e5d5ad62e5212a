//! Declarative condition evaluation against a target snapshot.
//!
//! All present keys are ANDed; an empty condition set matches. Lookup errors
//! fail open (the whole evaluation reports a match) so automation does not
//! stall on transient CRM failures; a missing contact or lead, by contrast,
//! is a definite non-match for the key that needed it.

use std::sync::Arc;

use chrono::{Local, Timelike};
use tracing::warn;
use uuid::Uuid;

use crate::domain::models::{Conditions, FollowUpTarget};
use crate::domain::ports::{Clock, CrmLookup};

pub struct ConditionEvaluator<L: CrmLookup, C: Clock> {
    crm: Arc<L>,
    clock: Arc<C>,
}

impl<L: CrmLookup, C: Clock> ConditionEvaluator<L, C> {
    pub fn new(crm: Arc<L>, clock: Arc<C>) -> Self {
        Self { crm, clock }
    }

    pub async fn evaluate(
        &self,
        conditions: &Conditions,
        org_id: Uuid,
        target: &FollowUpTarget,
    ) -> bool {
        if conditions.is_empty() {
            return true;
        }

        if let Some(required_stage) = &conditions.lead_stage {
            let Some(lead_id) = target.lead_id else {
                return false;
            };
            match self.crm.get_lead(org_id, lead_id).await {
                Ok(Some(lead)) => {
                    if lead.stage != *required_stage {
                        return false;
                    }
                }
                Ok(None) => return false,
                Err(err) => {
                    warn!(lead_id = %lead_id, error = %err, "lead lookup failed; failing open");
                    return true;
                }
            }
        }

        if !conditions.contact_tags.is_empty() {
            let Some(contact_id) = target.contact_id else {
                return false;
            };
            match self.crm.get_contact(org_id, contact_id).await {
                Ok(Some(contact)) => {
                    let all_present = conditions
                        .contact_tags
                        .iter()
                        .all(|tag| contact.tags.contains(tag));
                    if !all_present {
                        return false;
                    }
                }
                Ok(None) => return false,
                Err(err) => {
                    warn!(contact_id = %contact_id, error = %err, "contact lookup failed; failing open");
                    return true;
                }
            }
        }

        if let Some(window) = &conditions.time_of_day {
            let hour = self.clock.now().with_timezone(&Local).hour();
            if !window.contains(hour) {
                return false;
            }
        }

        true
    }
}
