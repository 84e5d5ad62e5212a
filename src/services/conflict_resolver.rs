//! Appointment conflict detection and alternative-slot suggestion.
//!
//! A proposed window `[start, start + duration)` conflicts with any
//! slot-blocking appointment whose window intersects it at all, scoped to the
//! organization and, when given, the same property address.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::errors::DomainResult;
use crate::domain::models::Appointment;
use crate::domain::ports::{AppointmentRepository, Clock};

/// Candidate offsets for alternative slots, in suggestion order.
/// Deliberately not sorted by proximity to the requested time.
const SUGGESTION_OFFSETS_MINUTES: [i64; 5] = [-60, -30, 30, 60, 24 * 60];

/// Maximum number of alternatives returned by `suggest`.
const MAX_SUGGESTIONS: usize = 3;

/// Half-open interval intersection: `[a_start, a_end)` meets `[b_start, b_end)`.
pub fn windows_overlap(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start < b_end && b_start < a_end
}

pub struct ConflictResolver<R: AppointmentRepository, C: Clock> {
    appointments: Arc<R>,
    clock: Arc<C>,
}

impl<R: AppointmentRepository, C: Clock> ConflictResolver<R, C> {
    pub fn new(appointments: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            appointments,
            clock,
        }
    }

    /// Appointments blocking the proposed window. Empty means no conflict.
    pub async fn check(
        &self,
        org_id: Uuid,
        start: DateTime<Utc>,
        duration_minutes: i64,
        property_address: Option<&str>,
    ) -> DomainResult<Vec<Appointment>> {
        let end = start + Duration::minutes(duration_minutes);
        self.appointments
            .find_overlapping(org_id, start, end, property_address)
            .await
    }

    /// Up to three conflict-free, strictly-future alternative start times,
    /// tried at fixed offsets around the requested time.
    pub async fn suggest(
        &self,
        org_id: Uuid,
        requested: DateTime<Utc>,
        duration_minutes: i64,
        property_address: Option<&str>,
    ) -> DomainResult<Vec<DateTime<Utc>>> {
        let now = self.clock.now();
        let mut suggestions = Vec::new();

        for offset in SUGGESTION_OFFSETS_MINUTES {
            if suggestions.len() == MAX_SUGGESTIONS {
                break;
            }
            let candidate = requested + Duration::minutes(offset);
            if candidate <= now {
                continue;
            }
            let conflicts = self
                .check(org_id, candidate, duration_minutes, property_address)
                .await?;
            if conflicts.is_empty() {
                suggestions.push(candidate);
            }
        }

        debug!(
            org_id = %org_id,
            requested = %requested,
            count = suggestions.len(),
            "computed alternative slots"
        );
        Ok(suggestions)
    }
}
