mod common;

use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use cadence::adapters::sqlite::SqliteAppointmentRepository;
use cadence::domain::models::{Appointment, AppointmentStatus, AppointmentType};
use cadence::domain::ports::{AppointmentInsert, AppointmentRepository, FixedClock};
use cadence::services::ConflictResolver;

use common::{fixed_now, setup_pool};

fn test_appointment(
    org_id: Uuid,
    start: chrono::DateTime<chrono::Utc>,
    duration_minutes: i64,
    property: Option<&str>,
    status: AppointmentStatus,
) -> Appointment {
    let now = fixed_now();
    Appointment {
        id: Uuid::new_v4(),
        org_id,
        appointment_type: AppointmentType::Showing,
        scheduled_at: start,
        duration_minutes,
        location: None,
        property_address: property.map(String::from),
        attendees: vec!["agent@example.com".to_string()],
        requirements: None,
        status,
        notes: None,
        contact_id: None,
        lead_id: None,
        thread_id: None,
        confirmation_token: "confirm-token".to_string(),
        reschedule_token: "reschedule-token".to_string(),
        completed_at: None,
        cancelled_at: None,
        cancellation_reason: None,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn overlapping_showing_at_same_property_collides() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let clock = Arc::new(FixedClock(fixed_now()));
    let resolver = ConflictResolver::new(Arc::clone(&repo), clock);

    let org_id = Uuid::new_v4();
    let start = fixed_now() + Duration::hours(2);
    let existing = test_appointment(
        org_id,
        start,
        60,
        Some("123 Main St"),
        AppointmentStatus::Confirmed,
    );
    assert!(matches!(
        repo.create_if_no_conflict(&existing)
            .await
            .expect("insert failed"),
        AppointmentInsert::Created
    ));

    // A showing starting 30 minutes into the existing hour-long window.
    let conflicts = resolver
        .check(org_id, start + Duration::minutes(30), 60, Some("123 Main St"))
        .await
        .expect("check failed");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, existing.id);
}

#[tokio::test]
async fn different_property_does_not_collide() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let clock = Arc::new(FixedClock(fixed_now()));
    let resolver = ConflictResolver::new(Arc::clone(&repo), clock);

    let org_id = Uuid::new_v4();
    let start = fixed_now() + Duration::hours(2);
    let existing = test_appointment(
        org_id,
        start,
        60,
        Some("123 Main St"),
        AppointmentStatus::Confirmed,
    );
    repo.create_if_no_conflict(&existing)
        .await
        .expect("insert failed");

    let conflicts = resolver
        .check(org_id, start, 60, Some("456 Oak Ave"))
        .await
        .expect("check failed");
    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn cancelled_appointments_do_not_block() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let clock = Arc::new(FixedClock(fixed_now()));
    let resolver = ConflictResolver::new(Arc::clone(&repo), clock);

    let org_id = Uuid::new_v4();
    let start = fixed_now() + Duration::hours(2);
    let cancelled = test_appointment(org_id, start, 60, None, AppointmentStatus::Cancelled);
    repo.create_if_no_conflict(&cancelled)
        .await
        .expect("insert failed");

    let conflicts = resolver
        .check(org_id, start, 60, None)
        .await
        .expect("check failed");
    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn back_to_back_bookings_do_not_collide() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let clock = Arc::new(FixedClock(fixed_now()));
    let resolver = ConflictResolver::new(Arc::clone(&repo), clock);

    let org_id = Uuid::new_v4();
    let start = fixed_now() + Duration::hours(2);
    let existing = test_appointment(org_id, start, 60, None, AppointmentStatus::Confirmed);
    repo.create_if_no_conflict(&existing)
        .await
        .expect("insert failed");

    let conflicts = resolver
        .check(org_id, start + Duration::minutes(60), 60, None)
        .await
        .expect("check failed");
    assert!(conflicts.is_empty());
}

#[tokio::test]
async fn subsecond_instants_keep_the_boundary_half_open() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let clock = Arc::new(FixedClock(fixed_now()));
    let resolver = ConflictResolver::new(Arc::clone(&repo), clock);

    let org_id = Uuid::new_v4();
    // A start instant with fractional seconds: the stored text and the query
    // binds must agree at the boundary even when other instants are whole
    // seconds.
    let start = fixed_now() + Duration::hours(2) + Duration::milliseconds(250);
    let existing = test_appointment(org_id, start, 60, None, AppointmentStatus::Confirmed);
    repo.create_if_no_conflict(&existing)
        .await
        .expect("insert failed");

    // Back-to-back at the exact fractional end instant: no collision.
    let conflicts = resolver
        .check(org_id, start + Duration::minutes(60), 60, None)
        .await
        .expect("check failed");
    assert!(conflicts.is_empty());

    // A whole-second window overlapping the fractional one by 250ms collides.
    let conflicts = resolver
        .check(org_id, fixed_now() + Duration::hours(2), 60, None)
        .await
        .expect("check failed");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, existing.id);
    assert_eq!(conflicts[0].scheduled_at, start);
}

#[tokio::test]
async fn suggestions_are_future_conflict_free_and_capped() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let now = fixed_now();
    let clock = Arc::new(FixedClock(now));
    let resolver = ConflictResolver::new(Arc::clone(&repo), Arc::clone(&clock));

    let org_id = Uuid::new_v4();
    let requested = now + Duration::hours(2);
    let existing = test_appointment(
        org_id,
        requested,
        60,
        Some("123 Main St"),
        AppointmentStatus::Confirmed,
    );
    repo.create_if_no_conflict(&existing)
        .await
        .expect("insert failed");

    let suggestions = resolver
        .suggest(org_id, requested, 60, Some("123 Main St"))
        .await
        .expect("suggest failed");

    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 3);
    for candidate in &suggestions {
        assert!(*candidate > now, "suggestion must be in the future");
        let conflicts = resolver
            .check(org_id, *candidate, 60, Some("123 Main St"))
            .await
            .expect("check failed");
        assert!(conflicts.is_empty(), "suggestion must be conflict-free");
    }
}

#[tokio::test]
async fn suggestions_skip_past_candidates() {
    let pool = setup_pool().await;
    let repo = Arc::new(SqliteAppointmentRepository::new(pool));
    let now = fixed_now();
    let clock = Arc::new(FixedClock(now));
    let resolver = ConflictResolver::new(repo, clock);

    let org_id = Uuid::new_v4();
    // Requested 30 minutes out: the -60 and -30 minute candidates fall at or
    // before "now" and must not be offered.
    let requested = now + Duration::minutes(30);
    let suggestions = resolver
        .suggest(org_id, requested, 60, None)
        .await
        .expect("suggest failed");

    for candidate in &suggestions {
        assert!(*candidate > now);
    }
}
