//! [`Tracker`] – heading and grid-position bookkeeping.
//!
//! Pure state and arithmetic; no I/O.  A patrol move is always expressed
//! relative to the current heading (forward / left / right), so the tracker
//! first resolves the *absolute* heading the robot will face after the turn
//! and then projects the position along it.

use hammer_types::{Direction, Heading, PatrolDirection, Position};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    heading: Heading,
    position: Position,
    zone_radius: i32,
}

impl Tracker {
    /// Tracker at the origin, facing forward.
    pub fn new(zone_radius: i32) -> Self {
        Self::at(Heading::Forward, Position::ORIGIN, zone_radius)
    }

    /// Tracker at an arbitrary pose.
    pub fn at(heading: Heading, position: Position, zone_radius: i32) -> Self {
        Self {
            heading,
            position,
            zone_radius,
        }
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn zone_radius(&self) -> i32 {
        self.zone_radius
    }

    /// Turn by `offset` quarter turns (wrapping modulo 4) and return the new
    /// heading.
    pub fn advance_heading(&mut self, offset: i32) -> Heading {
        self.heading = self.heading.turned(offset);
        self.heading
    }

    /// Apply the heading change implied by a dispatched direction.  Anything
    /// other than left/right, including an unrecognised word, leaves the
    /// heading unchanged.
    pub fn turn_for(&mut self, direction: Option<Direction>) -> Heading {
        self.advance_heading(direction.map_or(0, Direction::turn_offset))
    }

    /// Cell reached by turning toward `direction` and driving `steps`.
    pub fn project(&self, direction: PatrolDirection, steps: u32) -> Position {
        let absolute = self.heading.turned(direction.turn_offset());
        self.position.offset(absolute, steps)
    }

    /// `true` when the projected move would put either coordinate outside
    /// the zone.  Does not mutate.
    pub fn would_leave_zone(&self, direction: PatrolDirection, steps: u32) -> bool {
        !self.project(direction, steps).within(self.zone_radius)
    }

    /// Write the projected position if, and only if, it stays in the zone.
    /// Returns the new position on success.
    pub fn commit_move(&mut self, direction: PatrolDirection, steps: u32) -> Option<Position> {
        let target = self.project(direction, steps);
        if !target.within(self.zone_radius) {
            return None;
        }
        self.position = target;
        Some(target)
    }
}
