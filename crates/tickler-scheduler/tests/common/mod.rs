//! Test channels shared by the scheduler integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use tickler_core::error::{Result, TicklerError};
use tickler_scheduler::dispatch::{Notification, NotifyChannel};

/// Records every notification it is asked to deliver.
pub struct RecordingChannel {
    pub sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingChannel {
    pub fn new() -> (Self, Arc<Mutex<Vec<Notification>>>) {
        let sent = Arc::new(Mutex::new(Vec::new()));
        (Self { sent: sent.clone() }, sent)
    }
}

#[async_trait]
impl NotifyChannel for RecordingChannel {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, notification: &Notification) -> Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        Ok(())
    }
}

/// Always fails, standing in for an unreachable remote push service.
pub struct FailingChannel;

#[async_trait]
impl NotifyChannel for FailingChannel {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&self, _notification: &Notification) -> Result<()> {
        Err(TicklerError::Channel("connection refused".into()))
    }
}
