//! Polled range sensor.

use hammer_types::HammerError;

/// A proximity/range sensor that is sampled on demand.  No interrupt or
/// push model is assumed.
pub trait RangeSensor: Send + Sync {
    fn id(&self) -> &str;

    /// Take one distance sample, in the sensor's native units (the infrared
    /// sensor reports 0–100, roughly percent of its range).
    ///
    /// # Errors
    ///
    /// Returns [`HammerError::SensorUnavailable`] when no reading could be
    /// taken.
    fn sample_distance(&mut self) -> Result<f32, HammerError>;
}
