//! Broadcast event bus carrying robot notifications to their listeners.
//!
//! Uses [`tokio::sync::broadcast`] so every subscriber receives every event
//! and a slow subscriber never blocks the publishing control loop.  The
//! voice-assistant bridge is one subscriber; the CLI console and tests are
//! others.

use hammer_types::{Event, HammerError, Notification};
use tokio::sync::broadcast;
use tracing::debug;

use crate::sink::NotificationSink;

/// Default channel capacity (events buffered before a lagging subscriber
/// starts losing the oldest ones).
const DEFAULT_CAPACITY: usize = 64;

/// Shared event bus.  Clones are cheap and share one channel.
#[derive(Clone, Debug)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    source: String,
}

impl EventBus {
    /// Create a bus whose emitted events are stamped with `source`.
    pub fn new(capacity: usize, source: impl Into<String>) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            source: source.into(),
        }
    }

    /// Publish `event` to every current subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::Channel`] when nobody is subscribed.
    pub fn publish(&self, event: Event) -> Result<usize, HammerError> {
        self.sender
            .send(event)
            .map_err(|e| HammerError::Channel(format!("event bus send error: {e}")))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, "hammer")
    }
}

impl NotificationSink for EventBus {
    fn emit(&self, notification: Notification) {
        let name = notification.name();
        match self.publish(Event::new(self.source.clone(), notification)) {
            Ok(receivers) => debug!(event = name, receivers, "notification published"),
            Err(_) => debug!(event = name, "notification dropped; no subscribers"),
        }
    }
}
