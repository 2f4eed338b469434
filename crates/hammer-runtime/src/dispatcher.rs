//! [`Dispatcher`] – turns a [`MoveCommand`] into drive motion and the
//! matching heading/flag update.
//!
//! | direction | motion | state |
//! |---|---|---|
//! | forward | both sides `+speed` for `steps` rotations | – |
//! | backward | both sides `-speed` | – |
//! | left | pivot `(+speed, -speed)`, then forward | heading −1 |
//! | right | pivot `(-speed, +speed)`, then forward | heading +1 |
//! | stop | cut power | patrol off, watch re-armed |
//! | pause | cut power | – |
//!
//! Directional moves never touch the tracked grid position; only the patrol
//! loop commits positions.
//!
//! The drive sits behind its own mutex, so calls from the patrol loop, the
//! obstacle watch and external commands are serialised on the device.  The
//! drive lock is always taken before the state lock, never the other way
//! round.

use std::sync::{Mutex, PoisonError};

use hammer_hal::DriveDevice;
use hammer_types::{Direction, HammerError, MoveCommand};
use tracing::{debug, info, instrument, warn};

use crate::config::BehaviorConfig;
use crate::state::SharedState;

pub struct Dispatcher {
    drive: Mutex<Box<dyn DriveDevice>>,
    state: SharedState,
    turn_degrees: f32,
    blocking: bool,
}

impl Dispatcher {
    pub fn new(drive: Box<dyn DriveDevice>, state: SharedState, config: &BehaviorConfig) -> Self {
        Self {
            drive: Mutex::new(drive),
            state,
            turn_degrees: config.turn_degrees,
            blocking: config.blocking_moves,
        }
    }

    /// Execute one command.  Device faults are logged and not retried; an
    /// unrecognised direction is silently ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn execute(&self, command: MoveCommand) {
        let Some(direction) = command.direction else {
            debug!("direction not in vocabulary; no motion");
            return;
        };
        let mut drive = self.drive.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = self.apply(&mut **drive, direction, command) {
            warn!(error = %e, %direction, "drive command failed");
        }
    }

    /// Cut drive power without touching any flag.
    pub fn halt(&self) {
        self.execute(MoveCommand::pause());
    }

    fn apply(
        &self,
        drive: &mut dyn DriveDevice,
        direction: Direction,
        command: MoveCommand,
    ) -> Result<(), HammerError> {
        let MoveCommand { steps, speed, .. } = command;
        let rotations = steps as f32;
        match direction {
            Direction::Forward => drive.drive_rotations(speed, speed, rotations, self.blocking),
            Direction::Backward => drive.drive_rotations(-speed, -speed, rotations, self.blocking),
            Direction::Left | Direction::Right => {
                let (left, right) = if direction == Direction::Left {
                    (speed, -speed)
                } else {
                    (-speed, speed)
                };
                // Pivot always blocks so the forward leg starts from the new
                // heading.
                drive.drive_degrees(left, right, self.turn_degrees, true)?;
                let heading = self.state.with(|s| s.tracker.turn_for(Some(direction)));
                debug!(%heading, "turned");
                drive.drive_rotations(speed, speed, rotations, self.blocking)
            }
            Direction::Stop => {
                let stopped = drive.stop();
                self.state.with(|s| {
                    s.patrol_active = false;
                    s.watch_armed = true;
                });
                info!("stop: patrol cleared, watch re-armed");
                stopped
            }
            Direction::Pause => drive.stop(),
        }
    }
}
