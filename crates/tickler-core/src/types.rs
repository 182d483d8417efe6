//! Task and Reminder definitions — the data model the scheduler operates on.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// A unit of work owned by the persistence layer. The scheduler only reads
/// tasks (for display text) via id lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique id, assigned by the store on creation.
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    /// Optional due instant, canonicalized to the reference timezone.
    pub due_at: Option<DateTime<FixedOffset>>,
    pub status: TaskStatus,
    /// 1 = high, 2 = medium, 3 = low.
    #[serde(default = "default_priority")]
    pub priority: i32,
    /// Free-form comma-separated tags.
    #[serde(default)]
    pub tags: String,
    pub created_at: DateTime<FixedOffset>,
    pub updated_at: Option<DateTime<FixedOffset>>,
}

fn default_priority() -> i32 {
    2
}

/// Task status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "done" => TaskStatus::Done,
            _ => TaskStatus::Pending,
        }
    }
}

/// Fields accepted when creating a task. `due_at` must already be
/// canonicalized to the reference timezone by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_at: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub priority: Option<i32>,
    #[serde(default)]
    pub tags: Option<String>,
}

impl NewTask {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            due_at: None,
            priority: None,
            tags: None,
        }
    }

    pub fn due_at(mut self, due_at: DateTime<FixedOffset>) -> Self {
        self.due_at = Some(due_at);
        self
    }
}

/// A scheduled notification tied to exactly one Task. Deleted when its task
/// is deleted, and retired by the scheduler immediately after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub task_id: i64,
    /// Always zone-aware; canonicalized to the reference timezone at write time.
    pub remind_at: DateTime<FixedOffset>,
    /// Lead time in minutes, subtracted from `remind_at` to get the trigger
    /// instant. Zero means the reminder fires at `remind_at` itself.
    #[serde(default)]
    pub advance_minutes: u32,
    /// Transient intra-cycle marker; a reminder is deleted right after it
    /// flips to true, so the flag never survives as history.
    #[serde(default)]
    pub notified: bool,
    pub created_at: DateTime<FixedOffset>,
}

impl Reminder {
    /// The instant this reminder should actually fire.
    pub fn trigger_at(&self) -> DateTime<FixedOffset> {
        self.remind_at - Duration::minutes(self.advance_minutes as i64)
    }
}
