mod common;

use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;

use cadence::adapters::sqlite::{SqliteAppointmentRepository, SqliteReminderRepository};
use cadence::domain::errors::DomainError;
use cadence::domain::models::{
    AppointmentFilters, AppointmentPatch, AppointmentStatus, AppointmentType,
    CreateAppointmentRequest,
};
use cadence::domain::ports::{FixedClock, NullHooks, RandTokenGenerator, ReminderRepository};
use cadence::services::AppointmentService;

use common::{fixed_now, setup_pool};

type Service = AppointmentService<
    SqliteAppointmentRepository,
    SqliteReminderRepository,
    NullHooks,
    FixedClock,
    RandTokenGenerator,
>;

fn build_service(pool: &SqlitePool) -> (Service, Arc<SqliteReminderRepository>) {
    let appointments = Arc::new(SqliteAppointmentRepository::new(pool.clone()));
    let reminders = Arc::new(SqliteReminderRepository::new(pool.clone()));
    let service = AppointmentService::new(
        appointments,
        Arc::clone(&reminders),
        Arc::new(NullHooks),
        Arc::new(RandTokenGenerator),
        Arc::new(FixedClock(fixed_now())),
    );
    (service, reminders)
}

fn showing_request(org_id: Uuid, hours_out: i64, property: Option<&str>) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        org_id,
        appointment_type: AppointmentType::Showing,
        scheduled_at: fixed_now() + Duration::hours(hours_out),
        duration_minutes: 60,
        location: None,
        property_address: property.map(String::from),
        attendees: vec!["buyer@example.com".to_string()],
        requirements: None,
        contact_id: None,
        lead_id: None,
        thread_id: None,
        auto_confirm: true,
    }
}

#[tokio::test]
async fn test_create_appointment() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);

    let org_id = Uuid::new_v4();
    let appointment = service
        .create(showing_request(org_id, 48, Some("123 Main St")))
        .await
        .expect("create failed");

    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert_eq!(appointment.duration_minutes, 60);
    assert_eq!(appointment.confirmation_token.len(), 32);
    assert_eq!(appointment.reschedule_token.len(), 32);
    assert_ne!(appointment.confirmation_token, appointment.reschedule_token);
}

#[tokio::test]
async fn test_create_without_auto_confirm_is_pending() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);

    let mut request = showing_request(Uuid::new_v4(), 48, None);
    request.auto_confirm = false;
    let appointment = service.create(request).await.expect("create failed");
    assert_eq!(appointment.status, AppointmentStatus::Pending);
}

#[tokio::test]
async fn test_create_rejects_past_and_zero_duration() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);
    let org_id = Uuid::new_v4();

    let mut past = showing_request(org_id, 48, None);
    past.scheduled_at = fixed_now() - Duration::hours(1);
    assert!(matches!(
        service.create(past).await,
        Err(DomainError::ValidationFailed(_))
    ));

    let mut zero = showing_request(org_id, 48, None);
    zero.duration_minutes = 0;
    assert!(matches!(
        service.create(zero).await,
        Err(DomainError::ValidationFailed(_))
    ));
}

#[tokio::test]
async fn test_conflicting_booking_returns_conflict_and_suggestions() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);
    let org_id = Uuid::new_v4();

    let first = service
        .create(showing_request(org_id, 2, Some("123 Main St")))
        .await
        .expect("first booking failed");

    // Second showing 30 minutes into the first one, same property.
    let mut second = showing_request(org_id, 2, Some("123 Main St"));
    second.scheduled_at = first.scheduled_at + Duration::minutes(30);

    let err = service.create(second).await.expect_err("expected conflict");
    match err {
        DomainError::SchedulingConflict(conflict) => {
            assert_eq!(conflict.conflicts.len(), 1);
            assert_eq!(conflict.conflicts[0].id, first.id);
            assert!(!conflict.suggestions.is_empty());
            assert!(conflict.suggestions.len() <= 3);
            for candidate in &conflict.suggestions {
                assert!(*candidate > fixed_now());
            }
        }
        other => panic!("expected SchedulingConflict, got {:?}", other),
    }
}

#[tokio::test]
async fn test_reminders_scheduled_for_far_future_booking() {
    let pool = setup_pool().await;
    let (service, reminders) = build_service(&pool);

    let appointment = service
        .create(showing_request(Uuid::new_v4(), 48, None))
        .await
        .expect("create failed");

    let items = reminders
        .list_for_appointment(appointment.id)
        .await
        .expect("list failed");
    assert_eq!(items.len(), 3);
    // Ordered by trigger time: 24h, then 2h, then 30m before the start.
    assert_eq!(
        items[0].trigger_at,
        appointment.scheduled_at - Duration::hours(24)
    );
    assert_eq!(
        items[1].trigger_at,
        appointment.scheduled_at - Duration::hours(2)
    );
    assert_eq!(
        items[2].trigger_at,
        appointment.scheduled_at - Duration::minutes(30)
    );
}

#[tokio::test]
async fn test_past_due_reminders_are_dropped() {
    let pool = setup_pool().await;
    let (service, reminders) = build_service(&pool);

    // Three hours out: the 24-hour reminder would already be past due.
    let appointment = service
        .create(showing_request(Uuid::new_v4(), 3, None))
        .await
        .expect("create failed");

    let items = reminders
        .list_for_appointment(appointment.id)
        .await
        .expect("list failed");
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_update_records_completion_and_cancellation() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);
    let org_id = Uuid::new_v4();

    let appointment = service
        .create(showing_request(org_id, 48, None))
        .await
        .expect("create failed");

    let completed = service
        .update(
            org_id,
            appointment.id,
            AppointmentPatch {
                status: Some(AppointmentStatus::Completed),
                notes: Some("went well".to_string()),
                cancellation_reason: None,
            },
        )
        .await
        .expect("update failed");
    assert_eq!(completed.status, AppointmentStatus::Completed);
    assert_eq!(completed.completed_at, Some(fixed_now()));
    assert_eq!(completed.notes.as_deref(), Some("went well"));

    let cancelled = service
        .update(
            org_id,
            appointment.id,
            AppointmentPatch {
                status: Some(AppointmentStatus::Cancelled),
                notes: None,
                cancellation_reason: Some("buyer withdrew".to_string()),
            },
        )
        .await
        .expect("update failed");
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancelled_at, Some(fixed_now()));
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("buyer withdrew"));
}

#[tokio::test]
async fn test_update_unknown_appointment() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);

    let result = service
        .update(Uuid::new_v4(), Uuid::new_v4(), AppointmentPatch::default())
        .await;
    assert!(matches!(result, Err(DomainError::AppointmentNotFound(_))));
}

#[tokio::test]
async fn test_list_reports_summary_counts() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);
    let org_id = Uuid::new_v4();

    let kept = service
        .create(showing_request(org_id, 24, Some("123 Main St")))
        .await
        .expect("create failed");
    let doomed = service
        .create(showing_request(org_id, 72, Some("456 Oak Ave")))
        .await
        .expect("create failed");
    service
        .update(
            org_id,
            doomed.id,
            AppointmentPatch {
                status: Some(AppointmentStatus::Cancelled),
                notes: None,
                cancellation_reason: None,
            },
        )
        .await
        .expect("update failed");

    let listing = service
        .list(org_id, &AppointmentFilters::default())
        .await
        .expect("list failed");

    assert_eq!(listing.summary.total, 2);
    assert_eq!(listing.summary.confirmed, 1);
    assert_eq!(listing.summary.cancelled, 1);
    assert!(listing
        .insights
        .showing_properties
        .contains(&"123 Main St".to_string()));
    // Half of two appointments cancelled: above the high-cancellation line.
    assert!(listing.insights.high_cancellation_rate);
    assert_eq!(listing.appointments[0].id, doomed.id, "newest start first");
    assert_eq!(listing.appointments[1].id, kept.id);
}

#[tokio::test]
async fn test_list_filters_by_status() {
    let pool = setup_pool().await;
    let (service, _) = build_service(&pool);
    let org_id = Uuid::new_v4();

    service
        .create(showing_request(org_id, 24, None))
        .await
        .expect("create failed");

    let listing = service
        .list(
            org_id,
            &AppointmentFilters {
                status: Some(AppointmentStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .expect("list failed");
    assert!(listing.appointments.is_empty());
}
