mod common;

use std::sync::Arc;

use chrono::Duration;
use sqlx::SqlitePool;
use uuid::Uuid;

use cadence::adapters::sqlite::{
    SqliteCrmLookup, SqliteExecutionRepository, SqliteReminderRepository, SqliteSequenceRepository,
};
use cadence::application::FollowUpPoller;
use cadence::domain::errors::DomainError;
use cadence::domain::models::{PollerConfig, ReminderKind, ReminderWorkItem};
use cadence::domain::ports::{
    ActionDispatcher, DispatchAction, FixedClock, ReminderRepository,
};
use cadence::services::{SequenceEngine, TemplateCatalog};

use common::{fixed_now, setup_pool, FailingDispatcher, RecordingDispatcher};

type Poller<D> = FollowUpPoller<
    SqliteSequenceRepository,
    SqliteExecutionRepository,
    SqliteReminderRepository,
    SqliteCrmLookup,
    D,
    FixedClock,
>;

fn build_poller<D: ActionDispatcher>(
    pool: &SqlitePool,
    dispatcher: Arc<D>,
    config: PollerConfig,
) -> (Poller<D>, Arc<SqliteReminderRepository>) {
    let executions = Arc::new(SqliteExecutionRepository::new(pool.clone()));
    let reminders = Arc::new(SqliteReminderRepository::new(pool.clone()));
    let clock = Arc::new(FixedClock(fixed_now()));
    let engine = Arc::new(SequenceEngine::new(
        Arc::new(SqliteSequenceRepository::new(pool.clone())),
        Arc::clone(&executions),
        Arc::new(SqliteCrmLookup::new(pool.clone())),
        Arc::clone(&dispatcher),
        TemplateCatalog::builtin(),
        Arc::clone(&clock),
    ));
    let poller = FollowUpPoller::new(engine, executions, Arc::clone(&reminders), dispatcher, clock, config);
    (poller, reminders)
}

#[tokio::test]
async fn due_reminder_is_dispatched_exactly_once() {
    let pool = setup_pool().await;
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let (poller, reminders) = build_poller(&pool, Arc::clone(&dispatcher), PollerConfig::default());

    let org_id = Uuid::new_v4();
    let appointment_id = Uuid::new_v4();
    let due = ReminderWorkItem::new(
        org_id,
        appointment_id,
        ReminderKind::TwoHour,
        fixed_now() - Duration::minutes(5),
        fixed_now(),
    );
    let not_yet_due = ReminderWorkItem::new(
        org_id,
        appointment_id,
        ReminderKind::ThirtyMinute,
        fixed_now() + Duration::hours(1),
        fixed_now(),
    );
    reminders.create(&due).await.expect("create failed");
    reminders.create(&not_yet_due).await.expect("create failed");

    poller.poll_once().await;

    assert_eq!(dispatcher.sent_count(), 1);
    let envelope = dispatcher.last().expect("nothing dispatched");
    assert_eq!(envelope.org_id, org_id);
    match envelope.action {
        DispatchAction::AppointmentReminder {
            appointment_id: id,
            kind,
        } => {
            assert_eq!(id, appointment_id);
            assert_eq!(kind, ReminderKind::TwoHour);
        }
        other => panic!("unexpected action: {:?}", other),
    }

    // A second scan finds nothing left to deliver.
    poller.poll_once().await;
    assert_eq!(dispatcher.sent_count(), 1);

    let stored = reminders
        .list_for_appointment(appointment_id)
        .await
        .expect("list failed");
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].kind, ReminderKind::TwoHour);
    assert_eq!(stored[0].dispatched_at, Some(fixed_now()));
    assert_eq!(stored[1].dispatched_at, None);

    assert!(reminders
        .list_due(fixed_now(), 10)
        .await
        .expect("list_due failed")
        .is_empty());
}

#[tokio::test]
async fn failed_dispatch_leaves_reminder_due_for_retry() {
    let pool = setup_pool().await;
    let dispatcher = Arc::new(FailingDispatcher);
    // Zero elapsed budget: the dispatch is attempted once and given up.
    let config = PollerConfig {
        tick_interval_secs: 1,
        batch_size: 10,
        dispatch_max_elapsed_secs: 0,
    };
    let (poller, reminders) = build_poller(&pool, dispatcher, config);

    let reminder = ReminderWorkItem::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        ReminderKind::TwentyFourHour,
        fixed_now() - Duration::minutes(1),
        fixed_now(),
    );
    reminders.create(&reminder).await.expect("create failed");

    poller.poll_once().await;

    // Still undispatched: the next scan picks it up again.
    let still_due = reminders
        .list_due(fixed_now(), 10)
        .await
        .expect("list_due failed");
    assert_eq!(still_due.len(), 1);
    assert_eq!(still_due[0].id, reminder.id);
    assert_eq!(still_due[0].dispatched_at, None);
}

#[tokio::test]
async fn list_due_respects_limit_and_order() {
    let pool = setup_pool().await;
    let reminders = SqliteReminderRepository::new(pool.clone());

    let org_id = Uuid::new_v4();
    let older = ReminderWorkItem::new(
        org_id,
        Uuid::new_v4(),
        ReminderKind::TwentyFourHour,
        fixed_now() - Duration::hours(2),
        fixed_now(),
    );
    let newer = ReminderWorkItem::new(
        org_id,
        Uuid::new_v4(),
        ReminderKind::TwoHour,
        fixed_now() - Duration::hours(1),
        fixed_now(),
    );
    reminders.create(&newer).await.expect("create failed");
    reminders.create(&older).await.expect("create failed");

    let due = reminders
        .list_due(fixed_now(), 1)
        .await
        .expect("list_due failed");
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].id, older.id, "oldest trigger first");
}

#[tokio::test]
async fn mark_dispatched_unknown_reminder_is_not_found() {
    let pool = setup_pool().await;
    let reminders = SqliteReminderRepository::new(pool);

    let missing = Uuid::new_v4();
    let err = reminders
        .mark_dispatched(missing, fixed_now())
        .await
        .expect_err("marking a missing reminder should fail");
    assert!(matches!(err, DomainError::ReminderNotFound(id) if id == missing));
}
