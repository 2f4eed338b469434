//! In-process simulated drivers for headless runs and tests.
//!
//! Every simulated device records the calls it receives into a shared
//! [`CallLog`], and the simulated range sensor replays a [`RangeScript`], so
//! tests can drive the full behavior stack and assert on exactly what the
//! hardware was asked to do.
//!
//! # Example
//!
//! ```rust
//! use hammer_hal::sim::{DriveCall, SimHardware};
//!
//! let (mut hardware, probes) = SimHardware::new().build();
//! probes.range.push_repeated(10.0, 3);
//!
//! hardware.drive.drive_rotations(50, 50, 1.0, false).unwrap();
//! assert_eq!(
//!     probes.drive.snapshot(),
//!     vec![DriveCall::Rotations { left: 50, right: 50, rotations: 1.0, blocking: false }]
//! );
//! assert_eq!(hardware.range.sample_distance().unwrap(), 10.0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use hammer_types::HammerError;
use tracing::debug;

use crate::drive::{DriveDevice, Implement};
use crate::hardware::Hardware;
use crate::indicator::{Color, Hold, Indicator, Side, Tone};
use crate::sensor::RangeSensor;

/// Distance reported by the simulated sensor when its script is empty.
pub const DEFAULT_IDLE_DISTANCE: f32 = 100.0;

// ────────────────────────────────────────────────────────────────────────────
// Call recording
// ────────────────────────────────────────────────────────────────────────────

/// Shared, clonable record of calls made to a simulated device.
#[derive(Debug)]
pub struct CallLog<T>(Arc<Mutex<Vec<T>>>);

impl<T> Clone for CallLog<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<T> Default for CallLog<T> {
    fn default() -> Self {
        Self(Arc::new(Mutex::new(Vec::new())))
    }
}

impl<T: Clone> CallLog<T> {
    fn record(&self, call: T) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).push(call);
    }

    /// Copy of every call recorded so far, oldest first.
    pub fn snapshot(&self) -> Vec<T> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DriveCall {
    Rotations {
        left: i32,
        right: i32,
        rotations: f32,
        blocking: bool,
    },
    Degrees {
        left: i32,
        right: i32,
        degrees: f32,
        blocking: bool,
    },
    Stop,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImplementCall {
    pub speed: i32,
    pub degrees: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorCall {
    Led { side: Side, color: Color, hold: Hold },
    Tone(Vec<Tone>),
}

fn sim_fault(component: &str) -> HammerError {
    HammerError::HardwareFault {
        component: component.to_string(),
        details: "simulated fault".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated drive
// ────────────────────────────────────────────────────────────────────────────

/// Simulated tank drive.  Records every call; fails every call when built
/// with [`SimDrive::failing`].
pub struct SimDrive {
    id: String,
    log: CallLog<DriveCall>,
    failing: bool,
}

impl SimDrive {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            log: CallLog::default(),
            failing: false,
        }
    }

    pub fn failing(id: impl Into<String>) -> Self {
        Self {
            failing: true,
            ..Self::new(id)
        }
    }

    pub fn log(&self) -> CallLog<DriveCall> {
        self.log.clone()
    }

    fn apply(&mut self, call: DriveCall) -> Result<(), HammerError> {
        if self.failing {
            return Err(sim_fault(&self.id));
        }
        debug!(drive = %self.id, ?call, "sim drive");
        self.log.record(call);
        Ok(())
    }
}

impl DriveDevice for SimDrive {
    fn id(&self) -> &str {
        &self.id
    }

    fn drive_rotations(
        &mut self,
        left_pct: i32,
        right_pct: i32,
        rotations: f32,
        blocking: bool,
    ) -> Result<(), HammerError> {
        self.apply(DriveCall::Rotations {
            left: left_pct,
            right: right_pct,
            rotations,
            blocking,
        })
    }

    fn drive_degrees(
        &mut self,
        left_pct: i32,
        right_pct: i32,
        degrees: f32,
        blocking: bool,
    ) -> Result<(), HammerError> {
        self.apply(DriveCall::Degrees {
            left: left_pct,
            right: right_pct,
            degrees,
            blocking,
        })
    }

    fn stop(&mut self) -> Result<(), HammerError> {
        self.apply(DriveCall::Stop)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated implement
// ────────────────────────────────────────────────────────────────────────────

pub struct SimImplement {
    id: String,
    log: CallLog<ImplementCall>,
}

impl SimImplement {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog<ImplementCall> {
        self.log.clone()
    }
}

impl Implement for SimImplement {
    fn id(&self) -> &str {
        &self.id
    }

    fn run_for_degrees(&mut self, speed_pct: i32, degrees: f32) -> Result<(), HammerError> {
        debug!(implement = %self.id, speed_pct, degrees, "sim implement");
        self.log.record(ImplementCall {
            speed: speed_pct,
            degrees,
        });
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated range sensor
// ────────────────────────────────────────────────────────────────────────────

/// Queue of upcoming sensor readings shared between a test (or the CLI) and
/// the [`SimRangeSensor`] that replays it.
#[derive(Debug, Clone, Default)]
pub struct RangeScript(Arc<Mutex<VecDeque<Result<f32, HammerError>>>>);

impl RangeScript {
    pub fn push(&self, distance: f32) {
        self.push_repeated(distance, 1);
    }

    pub fn push_repeated(&self, distance: f32, count: usize) {
        let mut queue = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        queue.extend(std::iter::repeat_n(Ok(distance), count));
    }

    /// Queue one failed read.
    pub fn push_failure(&self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Err(HammerError::SensorUnavailable(
                "simulated read failure".to_string(),
            )));
    }

    /// Number of scripted readings not yet consumed.
    pub fn pending(&self) -> usize {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn next(&self) -> Option<Result<f32, HammerError>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).pop_front()
    }
}

/// Simulated range sensor.  Replays its script, then reports
/// `idle_distance` forever.
pub struct SimRangeSensor {
    id: String,
    script: RangeScript,
    idle_distance: f32,
}

impl SimRangeSensor {
    pub fn new(id: impl Into<String>, idle_distance: f32) -> Self {
        Self {
            id: id.into(),
            script: RangeScript::default(),
            idle_distance,
        }
    }

    pub fn script(&self) -> RangeScript {
        self.script.clone()
    }
}

impl RangeSensor for SimRangeSensor {
    fn id(&self) -> &str {
        &self.id
    }

    fn sample_distance(&mut self) -> Result<f32, HammerError> {
        self.script.next().unwrap_or(Ok(self.idle_distance))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Simulated indicator
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct SimIndicator {
    log: CallLog<IndicatorCall>,
}

impl SimIndicator {
    pub fn log(&self) -> CallLog<IndicatorCall> {
        self.log.clone()
    }
}

impl Indicator for SimIndicator {
    fn set_indicator(&mut self, side: Side, color: Color, hold: Hold) -> Result<(), HammerError> {
        self.log.record(IndicatorCall::Led { side, color, hold });
        Ok(())
    }

    fn play_tone(&mut self, sequence: &[Tone]) -> Result<(), HammerError> {
        self.log.record(IndicatorCall::Tone(sequence.to_vec()));
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimHardware builder
// ────────────────────────────────────────────────────────────────────────────

/// Handles onto the simulated devices inside a [`Hardware`] bundle.
#[derive(Debug, Clone)]
pub struct SimProbes {
    pub drive: CallLog<DriveCall>,
    pub implement: CallLog<ImplementCall>,
    pub indicator: CallLog<IndicatorCall>,
    pub range: RangeScript,
}

/// Builder for a fully simulated [`Hardware`] bundle.
pub struct SimHardware {
    idle_distance: f32,
    failing_drive: bool,
}

impl Default for SimHardware {
    fn default() -> Self {
        Self {
            idle_distance: DEFAULT_IDLE_DISTANCE,
            failing_drive: false,
        }
    }
}

impl SimHardware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distance the sensor reports once its script is exhausted.
    pub fn with_idle_distance(mut self, distance: f32) -> Self {
        self.idle_distance = distance;
        self
    }

    /// Make every drive call fail with a hardware fault.
    pub fn with_failing_drive(mut self) -> Self {
        self.failing_drive = true;
        self
    }

    /// Consume the builder, returning the bundle and its probes.
    pub fn build(self) -> (Hardware, SimProbes) {
        let drive = if self.failing_drive {
            SimDrive::failing("sim_drive")
        } else {
            SimDrive::new("sim_drive")
        };
        let implement = SimImplement::new("sim_hammer");
        let range = SimRangeSensor::new("sim_ir", self.idle_distance);
        let indicator = SimIndicator::default();

        let probes = SimProbes {
            drive: drive.log(),
            implement: implement.log(),
            indicator: indicator.log(),
            range: range.script(),
        };
        let hardware = Hardware::new(
            Box::new(drive),
            Box::new(implement),
            Box::new(range),
            Box::new(indicator),
        );
        (hardware, probes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn sim_drive_records_calls_in_order() {
        let mut drive = SimDrive::new("d");
        let log = drive.log();
        drive.drive_degrees(40, -40, 490.0, true).unwrap();
        drive.stop().unwrap();
        assert_eq!(
            log.snapshot(),
            vec![
                DriveCall::Degrees {
                    left: 40,
                    right: -40,
                    degrees: 490.0,
                    blocking: true
                },
                DriveCall::Stop,
            ]
        );
    }

    #[test]
    fn failing_drive_reports_fault_and_records_nothing() {
        let mut drive = SimDrive::failing("d");
        let log = drive.log();
        let err = drive.stop().unwrap_err();
        assert!(matches!(
            err,
            HammerError::HardwareFault { ref component, .. } if component == "d"
        ));
        assert!(log.is_empty());
    }

    #[test]
    fn range_sensor_replays_script_then_idles() {
        let mut sensor = SimRangeSensor::new("ir", 80.0);
        let script = sensor.script();
        script.push(12.0);
        script.push_failure();
        assert_eq!(script.pending(), 2);

        assert_eq!(sensor.sample_distance().unwrap(), 12.0);
        assert!(matches!(
            sensor.sample_distance(),
            Err(HammerError::SensorUnavailable(_))
        ));
        assert_eq!(sensor.sample_distance().unwrap(), 80.0);
        assert_eq!(script.pending(), 0);
    }

    #[test]
    fn indicator_set_both_lights_each_side() {
        let mut indicator = SimIndicator::default();
        let log = indicator.log();
        indicator
            .set_both(Color::Red, Hold::For(Duration::from_secs(1)))
            .unwrap();
        assert_eq!(log.len(), 2);
        indicator
            .play_tone(&[Tone::new("C4", Duration::from_millis(250))])
            .unwrap();
        assert!(matches!(log.snapshot()[2], IndicatorCall::Tone(ref t) if t.len() == 1));
    }

    #[test]
    fn sim_hardware_probes_observe_bundle() {
        let (mut hw, probes) = SimHardware::new().with_idle_distance(55.0).build();
        hw.implement.run_for_degrees(100, 300.0).unwrap();
        assert_eq!(
            probes.implement.snapshot(),
            vec![ImplementCall {
                speed: 100,
                degrees: 300.0
            }]
        );
        assert_eq!(hw.range.sample_distance().unwrap(), 55.0);
        probes.drive.clear();
        assert!(probes.drive.is_empty());
    }
}
