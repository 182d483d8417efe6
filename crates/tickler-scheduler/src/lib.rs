//! # Tickler Scheduler
//!
//! The reminder scheduling and notification subsystem: decides when a stored
//! reminder becomes due, fires each one at most once, and keeps doing so for
//! the lifetime of the process.
//!
//! ## Architecture
//! ```text
//! API layer (external)
//!   └── ReminderLifecycle ── normalize + persist via ReminderStore
//!
//! ReminderWorker (single background tokio task, poll every 30s)
//!   ├── ReminderStore::due_reminders(now)   ← coarse pre-filter
//!   ├── per candidate: trigger = remind_at − advance_minutes
//!   └── due → Dispatcher
//!              ├── ConsoleChannel (local log, always on)
//!              └── TelegramChannel (sendMessage, if configured)
//!       then mark notified + delete (at-most-once by retirement)
//! ```
//!
//! No error inside a poll cycle terminates the worker: store failures are
//! retried on the next tick, channel failures are isolated per channel.

pub mod dispatch;
pub mod lifecycle;
pub mod worker;

pub use dispatch::{ConsoleChannel, Dispatcher, Notification, NotifyChannel, TelegramChannel};
pub use lifecycle::ReminderLifecycle;
pub use worker::{ReminderWorker, WorkerHandle};
