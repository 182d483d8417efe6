//! Reminder lifecycle — the two entry points the API layer calls.
//!
//! Implicit reminders are derived from task creation with a fixed lead time;
//! explicit ones carry a client-supplied `remind_at` and lead. Both paths
//! normalize timestamps into the reference zone before anything is persisted.

use chrono::Duration;
use std::sync::Arc;

use tickler_core::clock::RefZone;
use tickler_core::error::{Result, TicklerError};
use tickler_core::store::ReminderStore;
use tickler_core::types::{Reminder, Task};

pub struct ReminderLifecycle {
    store: Arc<dyn ReminderStore>,
    zone: RefZone,
    /// Lead time (minutes) for implicit reminders derived from a due instant.
    default_lead_minutes: u32,
}

impl ReminderLifecycle {
    pub fn new(store: Arc<dyn ReminderStore>, zone: RefZone, default_lead_minutes: u32) -> Self {
        Self {
            store,
            zone,
            default_lead_minutes,
        }
    }

    /// Derive an implicit reminder from a freshly created task.
    ///
    /// Best-effort: a failure here is logged for the operator and never
    /// propagates, so it cannot fail or roll back task creation.
    pub async fn on_task_created(&self, task: &Task) {
        let Some(due_at) = task.due_at else {
            return;
        };
        let remind_at =
            self.zone.canonicalize(due_at) - Duration::minutes(self.default_lead_minutes as i64);
        match self
            .store
            .create_reminder(task.id, remind_at, self.default_lead_minutes)
            .await
        {
            Ok(rem) => {
                tracing::info!(
                    "📅 Implicit reminder {} for task '{}' at {}",
                    rem.id,
                    task.title,
                    rem.remind_at
                );
            }
            Err(e) => {
                tracing::warn!("⚠️ Implicit reminder for task {} not created: {e}", task.id);
            }
        }
    }

    /// Create an explicit reminder for an existing task.
    ///
    /// `remind_at` may be naive (assumed reference zone) or offset-carrying
    /// (converted). An unknown task id surfaces as `TaskNotFound`; an
    /// unparseable timestamp as `MalformedTimestamp`.
    pub async fn on_reminder_requested(
        &self,
        task_id: i64,
        remind_at: &str,
        advance_minutes: Option<u32>,
    ) -> Result<Reminder> {
        let remind_at = self.zone.normalize(remind_at)?;
        if self.store.get_task(task_id).await?.is_none() {
            return Err(TicklerError::TaskNotFound(task_id));
        }
        self.store
            .create_reminder(task_id, remind_at, advance_minutes.unwrap_or(0))
            .await
    }
}
