//! # Tickler Core
//!
//! Shared foundation for the Tickler reminder system: configuration,
//! error taxonomy, the Task/Reminder data model, and the `ReminderStore`
//! contract the scheduler depends on.

pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use clock::RefZone;
pub use config::TicklerConfig;
pub use error::{Result, TicklerError};
pub use store::ReminderStore;
pub use types::{NewTask, Reminder, Task, TaskStatus};
