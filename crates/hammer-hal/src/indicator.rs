//! Cosmetic indicator hardware: the two status LEDs and the speaker.
//!
//! The core only ever writes to an [`Indicator`]; it never queries it.

use std::time::Duration;

use hammer_types::HammerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    Green,
    Red,
}

/// How long an LED keeps its colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    For(Duration),
    Persistent,
}

/// One note of a tone sequence, e.g. `("C4", 250ms)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tone {
    pub note: String,
    pub length: Duration,
}

impl Tone {
    pub fn new(note: impl Into<String>, length: Duration) -> Self {
        Self {
            note: note.into(),
            length,
        }
    }
}

/// LEDs plus speaker.  Fire-and-forget.
pub trait Indicator: Send + Sync {
    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the LED cannot be set.
    fn set_indicator(&mut self, side: Side, color: Color, hold: Hold) -> Result<(), HammerError>;

    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the speaker is unavailable.
    fn play_tone(&mut self, sequence: &[Tone]) -> Result<(), HammerError>;

    /// Set both LEDs to the same colour.
    ///
    /// # Errors
    ///
    /// Propagates the first LED failure.
    fn set_both(&mut self, color: Color, hold: Hold) -> Result<(), HammerError> {
        for side in Side::BOTH {
            self.set_indicator(side, color, hold)?;
        }
        Ok(())
    }
}
