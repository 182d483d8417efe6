//! SQLite store — tasks and reminders with cascading ownership.
//!
//! Connections are short-lived: each call opens its own connection and
//! closes it on return, so nothing is held across a scheduler sleep. The
//! worker is the sole mutator of `notified` and sole deleter of reminder
//! rows; task/reminder creation may happen concurrently from the API layer.

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use rusqlite::{Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use tickler_core::clock::RefZone;
use tickler_core::error::{Result, TicklerError};
use tickler_core::store::ReminderStore;
use tickler_core::types::{NewTask, Reminder, Task, TaskStatus};

/// SQLite-backed reminder store.
pub struct SqliteStore {
    path: PathBuf,
    zone: RefZone,
}

impl SqliteStore {
    /// Open or create the database at `path` and run migrations.
    pub fn open(path: &Path, zone: RefZone) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            path: path.to_path_buf(),
            zone,
        };
        store.conn()?.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT,
                due_at TEXT,
                status TEXT NOT NULL DEFAULT 'pending',
                priority INTEGER NOT NULL DEFAULT 2,
                tags TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE TABLE IF NOT EXISTS reminders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                remind_at TEXT NOT NULL,
                advance_minutes INTEGER NOT NULL DEFAULT 0,
                notified INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_reminders_due
                ON reminders (remind_at, notified);
            ",
        )
        .map_err(store_err)?;
        Ok(store)
    }

    /// Open a fresh connection. Foreign keys are off by default in SQLite,
    /// and cascade deletion depends on them, so enable per connection.
    fn conn(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path).map_err(store_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(store_err)?;
        Ok(conn)
    }

    // ─── Tasks ──────────────────────────────────────

    /// Create a task. `due_at` is expected pre-normalized by the caller.
    pub fn create_task(&self, new: &NewTask) -> Result<Task> {
        let conn = self.conn()?;
        let now = self.zone.now();
        conn.execute(
            "INSERT INTO tasks (title, description, due_at, status, priority, tags, created_at)
             VALUES (?1, ?2, ?3, 'pending', ?4, ?5, ?6)",
            rusqlite::params![
                new.title,
                new.description,
                new.due_at.map(|d| self.zone.to_storage(d)),
                new.priority.unwrap_or(2),
                new.tags.clone().unwrap_or_default(),
                self.zone.to_storage(now),
            ],
        )
        .map_err(store_err)?;
        let id = conn.last_insert_rowid();
        self.fetch_task(&conn, id)?
            .ok_or(TicklerError::TaskNotFound(id))
    }

    /// List all tasks, ordered by priority then due instant (soonest first).
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, title, description, due_at, status, priority, tags,
                        created_at, updated_at
                 FROM tasks ORDER BY priority ASC, due_at ASC",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([], raw_task)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .filter_map(|raw| self.task_from_raw(raw))
            .collect())
    }

    /// Mark a task done/pending. Returns false if the task does not exist.
    pub fn set_status(&self, task_id: i64, status: TaskStatus) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute(
                "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
                rusqlite::params![
                    status.as_str(),
                    self.zone.to_storage(self.zone.now()),
                    task_id
                ],
            )
            .map_err(store_err)?;
        Ok(changed > 0)
    }

    /// Delete a task and, via cascade, all its reminders. Returns false if
    /// the task does not exist.
    pub fn delete_task(&self, task_id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let changed = conn
            .execute("DELETE FROM tasks WHERE id = ?1", [task_id])
            .map_err(store_err)?;
        Ok(changed > 0)
    }

    fn fetch_task(&self, conn: &Connection, id: i64) -> Result<Option<Task>> {
        let raw = conn
            .query_row(
                "SELECT id, title, description, due_at, status, priority, tags,
                        created_at, updated_at
                 FROM tasks WHERE id = ?1",
                [id],
                raw_task,
            )
            .optional()
            .map_err(store_err)?;
        Ok(raw.and_then(|r| self.task_from_raw(r)))
    }

    fn task_from_raw(&self, raw: RawTask) -> Option<Task> {
        let parse = |s: &str| match self.zone.normalize(s) {
            Ok(dt) => Some(dt),
            Err(e) => {
                tracing::warn!("Skipping task {} with bad timestamp: {e}", raw.id);
                None
            }
        };
        let created_at = parse(&raw.created_at)?;
        Some(Task {
            id: raw.id,
            title: raw.title,
            description: raw.description,
            due_at: raw.due_at.as_deref().and_then(parse),
            status: TaskStatus::parse(&raw.status),
            priority: raw.priority,
            tags: raw.tags,
            created_at,
            updated_at: raw.updated_at.as_deref().and_then(parse),
        })
    }

    fn reminder_from_raw(&self, raw: RawReminder) -> Option<Reminder> {
        // A remind_at persisted without an offset (e.g. by an older writer)
        // is tagged with the reference zone here rather than dropped.
        let remind_at = match self.zone.normalize(&raw.remind_at) {
            Ok(dt) => dt,
            Err(e) => {
                tracing::warn!("Skipping reminder {} with bad remind_at: {e}", raw.id);
                return None;
            }
        };
        let created_at = self.zone.normalize(&raw.created_at).unwrap_or(remind_at);
        Some(Reminder {
            id: raw.id,
            task_id: raw.task_id,
            remind_at,
            advance_minutes: raw.advance_minutes,
            notified: raw.notified,
            created_at,
        })
    }
}

#[async_trait]
impl ReminderStore for SqliteStore {
    async fn due_reminders(&self, now: DateTime<FixedOffset>) -> Result<Vec<Reminder>> {
        let conn = self.conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, task_id, remind_at, advance_minutes, notified, created_at
                 FROM reminders WHERE remind_at <= ?1 AND notified = 0",
            )
            .map_err(store_err)?;
        let rows = stmt
            .query_map([self.zone.to_storage(now)], raw_reminder)
            .map_err(store_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(store_err)?;
        Ok(rows
            .into_iter()
            .filter_map(|raw| self.reminder_from_raw(raw))
            .collect())
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let conn = self.conn()?;
        self.fetch_task(&conn, id)
    }

    async fn create_reminder(
        &self,
        task_id: i64,
        remind_at: DateTime<FixedOffset>,
        advance_minutes: u32,
    ) -> Result<Reminder> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO reminders (task_id, remind_at, advance_minutes, notified, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![
                task_id,
                self.zone.to_storage(remind_at),
                advance_minutes,
                self.zone.to_storage(self.zone.now()),
            ],
        )
        .map_err(|e| match e {
            // The foreign key backstop: the task vanished between the
            // lifecycle check and this insert.
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                TicklerError::TaskNotFound(task_id)
            }
            other => store_err(other),
        })?;
        let id = conn.last_insert_rowid();
        let raw = conn
            .query_row(
                "SELECT id, task_id, remind_at, advance_minutes, notified, created_at
                 FROM reminders WHERE id = ?1",
                [id],
                raw_reminder,
            )
            .map_err(store_err)?;
        self.reminder_from_raw(raw)
            .ok_or_else(|| TicklerError::store(format!("reminder {id} unreadable after insert")))
    }

    async fn mark_notified(&self, reminder_id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "UPDATE reminders SET notified = 1 WHERE id = ?1",
            [reminder_id],
        )
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete_reminder(&self, reminder_id: i64) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM reminders WHERE id = ?1", [reminder_id])
            .map_err(store_err)?;
        Ok(())
    }
}

fn store_err(e: rusqlite::Error) -> TicklerError {
    TicklerError::Store(e.to_string())
}

// Raw row shapes — timestamps stay textual until parsed outside the
// rusqlite closure, where failures can be logged and skipped.

struct RawTask {
    id: i64,
    title: String,
    description: Option<String>,
    due_at: Option<String>,
    status: String,
    priority: i32,
    tags: String,
    created_at: String,
    updated_at: Option<String>,
}

fn raw_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawTask> {
    Ok(RawTask {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        due_at: row.get(3)?,
        status: row.get(4)?,
        priority: row.get(5)?,
        tags: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

struct RawReminder {
    id: i64,
    task_id: i64,
    remind_at: String,
    advance_minutes: u32,
    notified: bool,
    created_at: String,
}

fn raw_reminder(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawReminder> {
    Ok(RawReminder {
        id: row.get(0)?,
        task_id: row.get(1)?,
        remind_at: row.get(2)?,
        advance_minutes: row.get(3)?,
        notified: row.get::<_, i32>(4)? != 0,
        created_at: row.get(5)?,
    })
}
