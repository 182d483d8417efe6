//! Unified error types for Tickler.

use thiserror::Error;

/// Result type alias using TicklerError.
pub type Result<T> = std::result::Result<T, TicklerError>;

#[derive(Error, Debug)]
pub enum TicklerError {
    // Creation-time errors — the only ones surfaced to callers
    #[error("Task not found: {0}")]
    TaskNotFound(i64),

    #[error("Malformed timestamp: {0}")]
    MalformedTimestamp(String),

    // Store errors — caught at the cycle boundary, never fatal to the worker
    #[error("Store error: {0}")]
    Store(String),

    // Channel errors — caught per channel, never affect other channels
    #[error("Channel delivery failed: {0}")]
    Channel(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TicklerError {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            TicklerError::TaskNotFound(42).to_string(),
            "Task not found: 42"
        );
        assert_eq!(
            TicklerError::store("disk full").to_string(),
            "Store error: disk full"
        );
    }
}
