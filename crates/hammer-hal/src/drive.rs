//! Traits for the tank drive and the implement (hammer) motor.
//!
//! Speeds are signed percentages of the motor's maximum; a negative value
//! runs that side in reverse.  Pivot turns are expressed as one positive and
//! one negated side.

use hammer_types::HammerError;

/// Differential (tank) drive with a left and right motor.
pub trait DriveDevice: Send + Sync {
    /// Stable identifier used in logs and fault reports.
    fn id(&self) -> &str;

    /// Run both sides for `rotations` wheel rotations.
    ///
    /// When `blocking` is `false` the call returns as soon as the motion is
    /// issued, and a later command may preempt it.
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the motion cannot be
    /// issued.
    fn drive_rotations(
        &mut self,
        left_pct: i32,
        right_pct: i32,
        rotations: f32,
        blocking: bool,
    ) -> Result<(), HammerError>;

    /// Run both sides for `degrees` of motor rotation.
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the motion cannot be
    /// issued.
    fn drive_degrees(
        &mut self,
        left_pct: i32,
        right_pct: i32,
        degrees: f32,
        blocking: bool,
    ) -> Result<(), HammerError>;

    /// Cut power to both sides.
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the motors do not respond.
    fn stop(&mut self) -> Result<(), HammerError>;
}

/// Single-motor implement, e.g. the hammer arm.
pub trait Implement: Send + Sync {
    fn id(&self) -> &str;

    /// Rotate the implement motor by `degrees` at `speed_pct`, blocking until
    /// the motion completes.
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::HardwareFault`] when the motion fails.
    fn run_for_degrees(&mut self, speed_pct: i32, degrees: f32) -> Result<(), HammerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingDrive {
        issued: usize,
        stopped: bool,
    }

    impl DriveDevice for CountingDrive {
        fn id(&self) -> &str {
            "counting"
        }

        fn drive_rotations(&mut self, _: i32, _: i32, _: f32, _: bool) -> Result<(), HammerError> {
            self.issued += 1;
            Ok(())
        }

        fn drive_degrees(&mut self, _: i32, _: i32, _: f32, _: bool) -> Result<(), HammerError> {
            self.issued += 1;
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HammerError> {
            self.stopped = true;
            Ok(())
        }
    }

    #[test]
    fn drive_trait_is_object_safe() {
        let mut drive: Box<dyn DriveDevice> = Box::new(CountingDrive {
            issued: 0,
            stopped: false,
        });
        drive.drive_degrees(50, -50, 490.0, true).unwrap();
        drive.drive_rotations(50, 50, 2.0, false).unwrap();
        drive.stop().unwrap();
        assert_eq!(drive.id(), "counting");
    }
}
