//! `hammer-types` – shared vocabulary for the Hammer robot core.
//!
//! Motion primitives ([`Heading`], [`Position`], [`Direction`]), the
//! canonical [`Command`] set, notifications sent back to the voice-assistant
//! skill, and the crate-spanning [`HammerError`].

pub mod command;
pub mod motion;

pub use command::{Command, DEFAULT_SPEED, DEFAULT_STEPS, Directive, MoveCommand, Scalar};
pub use motion::{Direction, Heading, PatrolDirection, Position};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Custom events sent from the robot back to the skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name", content = "payload")]
pub enum Notification {
    /// Sustained close-range reading; carries the last measured distance.
    Proximity { distance: f32 },
    /// The implement finished a smash cycle.
    Smash {
        #[serde(rename = "Smashed")]
        smashed: u32,
    },
}

impl Notification {
    /// Event name as the skill expects it.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::Proximity { .. } => "Proximity",
            Notification::Smash { .. } => "Smash",
        }
    }

    /// Payload map as the skill expects it.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            Notification::Proximity { distance } => serde_json::json!({ "distance": distance }),
            Notification::Smash { smashed } => serde_json::json!({ "Smashed": smashed }),
        }
    }
}

/// Envelope for anything published on the event bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// e.g. `"hammer-runtime::obstacle_watch"`
    pub source: String,
    pub payload: Notification,
}

impl Event {
    pub fn new(source: impl Into<String>, payload: Notification) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            source: source.into(),
            payload,
        }
    }
}

/// Errors crossing crate boundaries.  None of them is fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HammerError {
    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Sensor Unavailable: {0}")]
    SensorUnavailable(String),

    #[error("Channel Error: {0}")]
    Channel(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notification_names_and_payloads() {
        let n = Notification::Proximity { distance: 12.0 };
        assert_eq!(n.name(), "Proximity");
        assert_eq!(n.payload()["distance"], 12.0);

        let n = Notification::Smash { smashed: 1 };
        assert_eq!(n.name(), "Smash");
        assert_eq!(n.payload()["Smashed"], 1);
    }

    #[test]
    fn event_serializes_with_named_payload() {
        let event = Event::new(
            "hammer-runtime::coordinator",
            Notification::Smash { smashed: 1 },
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["payload"]["name"], "Smash");
        assert_eq!(json["payload"]["payload"]["Smashed"], 1);
        assert_eq!(json["source"], "hammer-runtime::coordinator");
    }

    #[test]
    fn hammer_error_display() {
        let err = HammerError::HardwareFault {
            component: "drive".to_string(),
            details: "stalled".to_string(),
        };
        assert!(err.to_string().contains("drive"));
        assert!(
            HammerError::MalformedCommand("x".into())
                .to_string()
                .contains("Malformed")
        );
    }
}
