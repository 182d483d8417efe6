//! The due-reminder worker — a single long-lived background loop.
//!
//! Exactly one worker runs per process (repeated spawn is a no-op). Each
//! cycle re-queries fresh state through the store contract, so task and
//! reminder creation can happen concurrently from the API layer without
//! coordination. The worker is the sole mutator of `notified` and the sole
//! deleter of reminder rows, which is what makes dispatch at-most-once.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use tickler_core::clock::RefZone;
use tickler_core::store::ReminderStore;
use tickler_core::types::Reminder;

use crate::dispatch::{Dispatcher, Notification};

/// Process-wide start guard. Released on worker teardown so a stopped
/// worker can be replaced.
static WORKER_RUNNING: AtomicBool = AtomicBool::new(false);

pub struct ReminderWorker {
    store: Arc<dyn ReminderStore>,
    dispatcher: Arc<Dispatcher>,
    zone: RefZone,
    interval: std::time::Duration,
}

impl ReminderWorker {
    pub fn new(
        store: Arc<dyn ReminderStore>,
        dispatcher: Arc<Dispatcher>,
        zone: RefZone,
        interval_secs: u64,
    ) -> Self {
        Self {
            store,
            dispatcher,
            zone,
            interval: std::time::Duration::from_secs(interval_secs),
        }
    }

    /// One poll-and-process pass. Runs to completion; no yielding mid-cycle.
    /// Every failure path in here is logged and swallowed so the loop always
    /// resumes on the next tick.
    pub async fn run_cycle(&self) {
        let now = self.zone.now();
        tracing::debug!("Checking reminders at {now}");

        let due = match self.store.due_reminders(now).await {
            Ok(due) => due,
            Err(e) => {
                tracing::warn!("⚠️ Due-reminder query failed: {e} (retrying next tick)");
                return;
            }
        };

        for reminder in due {
            self.process(reminder).await;
        }
    }

    async fn process(&self, reminder: Reminder) {
        // The task may have been deleted out from under a stale reminder;
        // that race must not crash the loop.
        let title = match self.store.get_task(reminder.task_id).await {
            Ok(Some(task)) => task.title,
            Ok(None) => format!("Reminder #{}", reminder.id),
            Err(e) => {
                tracing::warn!("⚠️ Task lookup failed for reminder {}: {e}", reminder.id);
                return;
            }
        };

        // The coarse query only guarantees remind_at <= now; re-read the
        // clock and check the actual trigger instant.
        let now = self.zone.now();
        let trigger_at = reminder.trigger_at();
        if now < trigger_at {
            // Over-selected candidate: leave it untouched for a later cycle.
            tracing::debug!(
                "Reminder {} not yet triggered (trigger at {trigger_at})",
                reminder.id
            );
            return;
        }

        let body = format!(
            "Reminder for task: {} at {}",
            title,
            reminder.remind_at.format("%Y-%m-%d %I:%M %p")
        );
        let notification = Notification::new(&title, &body, now);

        // Best-effort dispatch: per-channel outcomes are already logged by
        // the dispatcher and do not gate retirement.
        let _ = self.dispatcher.dispatch(&notification).await;

        if let Err(e) = self.store.mark_notified(reminder.id).await {
            tracing::warn!("⚠️ Failed to mark reminder {} notified: {e}", reminder.id);
        }
        if let Err(e) = self.store.delete_reminder(reminder.id).await {
            tracing::warn!("⚠️ Failed to delete reminder {}: {e}", reminder.id);
        }
    }

    /// Start the background loop. Returns `None` if a worker is already
    /// running in this process — repeated initialization must not spawn a
    /// second loop double-processing the same reminders.
    pub fn spawn(self) -> Option<WorkerHandle> {
        if WORKER_RUNNING.swap(true, Ordering::SeqCst) {
            tracing::warn!("⚠️ Reminder worker already running; ignoring repeated start");
            return None;
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let join = tokio::spawn(async move {
            tracing::info!(
                "⏰ Reminder worker started (interval={}s, channels={:?})",
                self.interval.as_secs(),
                self.dispatcher.channel_names()
            );

            loop {
                // Stop is cooperative: observed here at the top of a cycle,
                // or below while sleeping. Never mid-processing.
                if *stop_rx.borrow() {
                    break;
                }

                self.run_cycle().await;

                tokio::select! {
                    _ = stop_rx.changed() => {
                        if *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = tokio::time::sleep(self.interval) => {}
                }
            }

            tracing::info!("Reminder worker stopped");
            WORKER_RUNNING.store(false, Ordering::SeqCst);
        });

        Some(WorkerHandle {
            stop: stop_tx,
            join,
        })
    }
}

/// Handle to a running worker. Dropping it without calling `stop` leaves
/// the worker running for the rest of the process.
pub struct WorkerHandle {
    stop: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Signal the loop and wait for it to finish its current cycle and exit.
    /// Releases the process-wide start guard.
    pub async fn stop(self) {
        let _ = self.stop.send(true);
        let _ = self.join.await;
    }
}
