//! End-to-end scenarios against the real SQLite store: lifecycle creates
//! reminders, the worker fires and retires them.

mod common;

use chrono::Duration;
use std::path::PathBuf;
use std::sync::Arc;

use common::RecordingChannel;
use tickler_core::clock::RefZone;
use tickler_core::error::TicklerError;
use tickler_core::store::ReminderStore;
use tickler_core::types::NewTask;
use tickler_scheduler::dispatch::Dispatcher;
use tickler_scheduler::lifecycle::ReminderLifecycle;
use tickler_scheduler::worker::ReminderWorker;
use tickler_store::SqliteStore;

fn temp_store(name: &str) -> (Arc<SqliteStore>, PathBuf) {
    let dir = std::env::temp_dir().join(format!("tickler-e2e-{name}"));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    let store = SqliteStore::open(&dir.join("e2e.db"), RefZone::default()).unwrap();
    (Arc::new(store), dir)
}

#[tokio::test]
async fn test_implicit_reminder_fires_at_lead_time() {
    let zone = RefZone::default();
    let (store, dir) = temp_store("implicit");

    // Task due 15 minutes from now: the implicit reminder lands at `now`,
    // i.e. exactly the lead-time mark before the due instant.
    let due_at = zone.now() + Duration::minutes(15);
    let task = store
        .create_task(&NewTask::new("team meeting").due_at(due_at))
        .unwrap();

    let lifecycle = ReminderLifecycle::new(store.clone(), zone, 15);
    lifecycle.on_task_created(&task).await;

    let due = store.due_reminders(zone.now()).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].advance_minutes, 15);
    // remind_at = due − lead (storage truncates to whole seconds)
    let expected = zone
        .normalize(&zone.to_storage(due_at - Duration::minutes(15)))
        .unwrap();
    assert_eq!(due[0].remind_at, expected);

    let (recorder, sent) = RecordingChannel::new();
    let dispatcher = Arc::new(Dispatcher::new().with_channel(Box::new(recorder)));
    let worker = ReminderWorker::new(store.clone(), dispatcher, zone, 1);
    worker.run_cycle().await;

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].title, "team meeting");
    assert!(store.due_reminders(zone.now()).await.unwrap().is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_task_without_due_instant_creates_no_reminder() {
    let zone = RefZone::default();
    let (store, dir) = temp_store("no-due");
    let task = store.create_task(&NewTask::new("someday maybe")).unwrap();

    let lifecycle = ReminderLifecycle::new(store.clone(), zone, 15);
    lifecycle.on_task_created(&task).await;

    let far_future = zone.now() + Duration::days(365);
    assert!(store.due_reminders(far_future).await.unwrap().is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_explicit_reminder_for_unknown_task_is_rejected() {
    let zone = RefZone::default();
    let (store, dir) = temp_store("notfound");

    let lifecycle = ReminderLifecycle::new(store.clone(), zone, 15);
    let err = lifecycle
        .on_reminder_requested(9999, "2030-01-01T09:00", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TicklerError::TaskNotFound(9999)));

    // Nothing was persisted
    let far_future = zone.now() + Duration::days(365 * 10);
    assert!(store.due_reminders(far_future).await.unwrap().is_empty());
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_explicit_reminder_rejects_malformed_timestamp() {
    let zone = RefZone::default();
    let (store, dir) = temp_store("malformed");
    let task = store.create_task(&NewTask::new("call mom")).unwrap();

    let lifecycle = ReminderLifecycle::new(store.clone(), zone, 15);
    let err = lifecycle
        .on_reminder_requested(task.id, "next tuesday-ish", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TicklerError::MalformedTimestamp(_)));
    std::fs::remove_dir_all(&dir).ok();
}

#[tokio::test]
async fn test_explicit_reminder_normalizes_foreign_offset() {
    let zone = RefZone::default();
    let (store, dir) = temp_store("offset");
    let task = store.create_task(&NewTask::new("call office")).unwrap();

    let lifecycle = ReminderLifecycle::new(store.clone(), zone, 15);
    // 12:30 UTC is 18:00 in the reference zone (+05:30)
    let rem = lifecycle
        .on_reminder_requested(task.id, "2030-01-10T12:30:00+00:00", Some(5))
        .await
        .unwrap();
    assert_eq!(rem.remind_at.to_rfc3339(), "2030-01-10T18:00:00+05:30");
    assert_eq!(rem.advance_minutes, 5);
    std::fs::remove_dir_all(&dir).ok();
}
