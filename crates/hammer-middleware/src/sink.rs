//! [`NotificationSink`] – where the behavior core reports what happened.

use std::sync::{Mutex, PoisonError};

use hammer_types::Notification;

/// Fire-and-forget notification channel back to the command source.
///
/// Implementations must not block the caller; the obstacle watch emits from
/// inside its polling loop.
pub trait NotificationSink: Send + Sync {
    fn emit(&self, notification: Notification);
}

/// Sink that keeps every notification in memory.  Used by tests and by
/// callers that poll for notifications instead of subscribing.
#[derive(Debug, Default)]
pub struct RecordingSink {
    emitted: Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<Notification> {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of notifications emitted under `name`.
    pub fn count(&self, name: &str) -> usize {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|n| n.name() == name)
            .count()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, notification: Notification) {
        self.emitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
