//! # Tickler Store
//!
//! SQLite-backed persistence for tasks and reminders. Implements the
//! `ReminderStore` contract from `tickler-core`.

pub mod sqlite;

pub use sqlite::SqliteStore;
