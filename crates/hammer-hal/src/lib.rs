//! `hammer-hal` – Hardware Abstraction Layer
//!
//! The behavior core talks to motors, sensors and indicators only through
//! the traits in this crate, so the physical drivers can be swapped without
//! touching patrol or obstacle logic.
//!
//! # Modules
//!
//! - [`drive`] – [`DriveDevice`] (tank drive) and [`Implement`] (hammer motor).
//! - [`sensor`] – [`RangeSensor`], a polled distance sensor.
//! - [`indicator`] – [`Indicator`] LEDs and speaker.
//! - [`hardware`] – [`Hardware`], the driver bundle handed to the runtime.
//! - [`sim`] – recording/scripted drivers for headless runs and tests.

pub mod drive;
pub mod hardware;
pub mod indicator;
pub mod sensor;
pub mod sim;

pub use drive::{DriveDevice, Implement};
pub use hardware::Hardware;
pub use indicator::{Color, Hold, Indicator, Side, Tone};
pub use sensor::RangeSensor;
