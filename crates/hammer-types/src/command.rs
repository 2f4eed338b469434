//! Commands accepted by the behavior core and the boundary decoder that
//! produces them from directive payloads.
//!
//! A directive is the JSON object delivered by the voice-assistant skill:
//!
//! ```json
//! {"type": "moveSteps", "direction": "go left", "steps": "2", "speed": 50}
//! ```
//!
//! Decoding fills in the defaults (one step, medium speed) and resolves the
//! direction word, so the core never handles surface strings.

use serde::{Deserialize, Serialize};

use crate::HammerError;
use crate::motion::Direction;

/// Step count used when a move directive omits `steps`.
pub const DEFAULT_STEPS: u32 = 1;
/// Speed percent used when a move directive omits `speed` ("medium").
pub const DEFAULT_SPEED: i32 = 50;

/// A single directional drive request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveCommand {
    /// `None` when the spoken word matched nothing in the vocabulary.  Such a
    /// command produces no motion and no turn.
    pub direction: Option<Direction>,
    /// Wheel rotations to drive.
    pub steps: u32,
    /// Signed percent of maximum motor speed.
    pub speed: i32,
}

impl MoveCommand {
    pub fn new(direction: Direction, steps: u32, speed: i32) -> Self {
        Self {
            direction: Some(direction),
            steps,
            speed,
        }
    }

    pub fn stop() -> Self {
        Self::new(Direction::Stop, 0, 0)
    }

    pub fn pause() -> Self {
        Self::new(Direction::Pause, 0, 0)
    }
}

/// Canonical command handed to the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Command {
    Move(MoveCommand),
    Patrol,
    Smash,
    Stop,
}

impl Command {
    /// Decode a raw JSON directive into a [`Command`].
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::MalformedCommand`] when the JSON is invalid,
    /// the directive type is unknown, or a required field is missing or
    /// unparsable.
    pub fn from_json(raw: &str) -> Result<Self, HammerError> {
        let directive: Directive = serde_json::from_str(raw)
            .map_err(|e| HammerError::MalformedCommand(format!("invalid directive: {e}")))?;
        Self::try_from(directive)
    }
}

/// A scalar that the skill may send either as a number or as a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Text(String),
}

/// Raw directive payload, exactly as the skill sends it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Directive {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Scalar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Scalar>,
}

impl TryFrom<Directive> for Command {
    type Error = HammerError;

    fn try_from(directive: Directive) -> Result<Self, Self::Error> {
        match directive.kind.as_str() {
            "moveSteps" | "move" => {
                let word = directive.direction.ok_or_else(|| {
                    HammerError::MalformedCommand("move directive without direction".to_string())
                })?;
                let steps = match directive.steps {
                    Some(s) => parse_steps(&s)?,
                    None => DEFAULT_STEPS,
                };
                let speed = match directive.speed {
                    Some(s) => parse_speed(&s)?,
                    None => DEFAULT_SPEED,
                };
                Ok(Command::Move(MoveCommand {
                    direction: Direction::from_word(&word),
                    steps,
                    speed,
                }))
            }
            "patrol" => Ok(Command::Patrol),
            "smash" => Ok(Command::Smash),
            "stop" => Ok(Command::Stop),
            other => Err(HammerError::MalformedCommand(format!(
                "unknown directive type '{other}'"
            ))),
        }
    }
}

/// Map a spoken speed word to a percent.
pub fn speed_from_word(word: &str) -> Option<i32> {
    match word.trim().to_lowercase().as_str() {
        "fast" => Some(100),
        "medium" => Some(50),
        "slow" => Some(10),
        _ => None,
    }
}

fn parse_steps(value: &Scalar) -> Result<u32, HammerError> {
    let n = match value {
        Scalar::Int(n) => *n,
        Scalar::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| HammerError::MalformedCommand(format!("steps '{s}' is not a number")))?,
    };
    u32::try_from(n)
        .map_err(|_| HammerError::MalformedCommand(format!("steps {n} must be non-negative")))
}

fn parse_speed(value: &Scalar) -> Result<i32, HammerError> {
    let n = match value {
        Scalar::Int(n) => *n,
        Scalar::Text(s) => match speed_from_word(s) {
            Some(pct) => i64::from(pct),
            None => s.trim().parse::<i64>().map_err(|_| {
                HammerError::MalformedCommand(format!("speed '{s}' is not a number"))
            })?,
        },
    };
    if !(-100..=100).contains(&n) {
        return Err(HammerError::MalformedCommand(format!(
            "speed {n} outside -100..=100"
        )));
    }
    Ok(n as i32)
}
