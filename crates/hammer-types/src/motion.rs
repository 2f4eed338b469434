//! Heading, grid position, and the drive direction vocabulary.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four cardinal headings, stored in turn order so that a right
/// turn is `+1` and a left turn is `-1` on the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    Forward,
    Right,
    Backward,
    Left,
}

impl Heading {
    /// Headings in cyclic turn order.
    pub const ALL: [Heading; 4] = [
        Heading::Forward,
        Heading::Right,
        Heading::Backward,
        Heading::Left,
    ];

    /// Position of this heading in [`Heading::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Map any integer onto a heading, wrapping modulo 4 in both directions.
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(4) as usize]
    }

    /// The heading reached after turning by `offset` quarter turns.
    pub fn turned(self, offset: i32) -> Self {
        Self::from_index(self.index() as i32 + offset)
    }

    /// Grid delta of a single step along this heading.  Forward/backward move
    /// along `y`, right/left along `x`.
    pub fn unit(self) -> (i32, i32) {
        match self {
            Heading::Forward => (0, 1),
            Heading::Right => (1, 0),
            Heading::Backward => (0, -1),
            Heading::Left => (-1, 0),
        }
    }
}

impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heading::Forward => "forward",
            Heading::Right => "right",
            Heading::Backward => "backward",
            Heading::Left => "left",
        };
        f.write_str(name)
    }
}

/// Cell on the abstract patrol grid.  The robot starts at the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The cell reached by moving `steps` cells along `heading`.
    pub fn offset(self, heading: Heading, steps: u32) -> Self {
        let (dx, dy) = heading.unit();
        let steps = steps as i32;
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }

    /// `true` when both coordinates lie in `[-radius, radius]`.
    pub fn within(self, radius: i32) -> bool {
        self.x.abs() <= radius && self.y.abs() <= radius
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Canonical drive directions understood by the dispatcher.
///
/// Surface words (including the spoken synonyms) are resolved once with
/// [`Direction::from_word`]; everything past the command boundary only sees
/// these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Stop,
    Pause,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Forward,
        Direction::Backward,
        Direction::Left,
        Direction::Right,
        Direction::Stop,
        Direction::Pause,
    ];

    /// Accepted surface strings for this direction, already lower-cased.
    pub fn synonyms(self) -> &'static [&'static str] {
        match self {
            Direction::Forward => &["forward", "forwards", "go forward"],
            Direction::Backward => &["backward", "back", "backwards", "go backward"],
            Direction::Left => &["left", "go left"],
            Direction::Right => &["right", "go right"],
            Direction::Stop => &["stop", "brake", "halt"],
            Direction::Pause => &["pause"],
        }
    }

    /// Resolve a spoken/typed word.  Case and surrounding or repeated
    /// whitespace are ignored.  Returns `None` for words outside the
    /// vocabulary.
    pub fn from_word(word: &str) -> Option<Self> {
        let normalized = word
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.synonyms().contains(&normalized.as_str()))
    }

    /// Heading index offset applied when the robot executes this direction.
    pub fn turn_offset(self) -> i32 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.synonyms()[0])
    }
}

/// The subset of directions the patrol loop draws from.  Backward is never
/// chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatrolDirection {
    Forward,
    Left,
    Right,
}

impl PatrolDirection {
    pub const ALL: [PatrolDirection; 3] = [
        PatrolDirection::Forward,
        PatrolDirection::Left,
        PatrolDirection::Right,
    ];

    pub fn turn_offset(self) -> i32 {
        Direction::from(self).turn_offset()
    }
}

impl From<PatrolDirection> for Direction {
    fn from(value: PatrolDirection) -> Self {
        match value {
            PatrolDirection::Forward => Direction::Forward,
            PatrolDirection::Left => Direction::Left,
            PatrolDirection::Right => Direction::Right,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_wraps_in_both_directions() {
        assert_eq!(Heading::from_index(4), Heading::Forward);
        assert_eq!(Heading::from_index(-1), Heading::Left);
        assert_eq!(Heading::from_index(-5), Heading::Left);
        assert_eq!(Heading::Left.turned(1), Heading::Forward);
        assert_eq!(Heading::Forward.turned(-1), Heading::Left);
    }

    #[test]
    fn position_offset_follows_heading_axes() {
        let p = Position::ORIGIN;
        assert_eq!(p.offset(Heading::Forward, 2), Position::new(0, 2));
        assert_eq!(p.offset(Heading::Backward, 3), Position::new(0, -3));
        assert_eq!(p.offset(Heading::Right, 1), Position::new(1, 0));
        assert_eq!(p.offset(Heading::Left, 2), Position::new(-2, 0));
    }

    #[test]
    fn from_word_normalizes_case_and_spacing() {
        assert_eq!(Direction::from_word("Forwards"), Some(Direction::Forward));
        assert_eq!(Direction::from_word("  GO   left "), Some(Direction::Left));
        assert_eq!(Direction::from_word("brake"), Some(Direction::Stop));
        assert_eq!(Direction::from_word("back"), Some(Direction::Backward));
        assert_eq!(Direction::from_word("PAUSE"), Some(Direction::Pause));
    }

    #[test]
    fn from_word_rejects_unknown_vocabulary() {
        assert_eq!(Direction::from_word("sideways"), None);
        assert_eq!(Direction::from_word(""), None);
    }

    #[test]
    fn only_left_and_right_turn() {
        assert_eq!(Direction::Left.turn_offset(), -1);
        assert_eq!(Direction::Right.turn_offset(), 1);
        for d in [
            Direction::Forward,
            Direction::Backward,
            Direction::Stop,
            Direction::Pause,
        ] {
            assert_eq!(d.turn_offset(), 0, "{d} must not turn");
        }
    }

    #[test]
    fn patrol_directions_exclude_backward() {
        assert!(
            PatrolDirection::ALL
                .iter()
                .all(|d| Direction::from(*d) != Direction::Backward)
        );
    }
}
