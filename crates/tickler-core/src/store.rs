//! The persistence contract the scheduler depends on.
//!
//! The worker never touches SQL directly — it sees exactly these five
//! operations. `tickler-store` provides the SQLite implementation; tests
//! substitute in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};

use crate::error::Result;
use crate::types::{Reminder, Task};

/// Reminder persistence operations used by the scheduler and the lifecycle
/// manager.
#[async_trait]
pub trait ReminderStore: Send + Sync {
    /// All reminders with `remind_at <= now` that have not been notified.
    ///
    /// This is a coarse pre-filter: it may over-select reminders whose
    /// trigger instant (after subtracting lead time) has not yet arrived.
    /// The worker refines the selection per candidate.
    async fn due_reminders(&self, now: DateTime<FixedOffset>) -> Result<Vec<Reminder>>;

    /// Look up a task by id. `None` if it was deleted.
    async fn get_task(&self, id: i64) -> Result<Option<Task>>;

    /// Persist a new reminder. `remind_at` must already be canonicalized to
    /// the reference timezone.
    async fn create_reminder(
        &self,
        task_id: i64,
        remind_at: DateTime<FixedOffset>,
        advance_minutes: u32,
    ) -> Result<Reminder>;

    /// Flip the notified flag. Idempotent; no-op if already notified or absent.
    async fn mark_notified(&self, reminder_id: i64) -> Result<()>;

    /// Remove a reminder. Idempotent; no-op if absent.
    async fn delete_reminder(&self, reminder_id: i64) -> Result<()>;
}
