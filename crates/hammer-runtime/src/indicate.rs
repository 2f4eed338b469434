//! Shared access to the status LEDs.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use hammer_hal::{Color, Hold, Indicator};
use tracing::warn;

pub type SharedIndicator = Arc<Mutex<Box<dyn Indicator>>>;

pub fn shared(indicator: Box<dyn Indicator>) -> SharedIndicator {
    Arc::new(Mutex::new(indicator))
}

/// Light both LEDs in `color` for `duration`.
pub fn flash_both(indicator: &SharedIndicator, color: Color, duration: Duration) {
    set_both(indicator, color, Hold::For(duration));
}

/// Set both LEDs.  Failures are cosmetic and only logged.
pub fn set_both(indicator: &SharedIndicator, color: Color, hold: Hold) {
    let mut leds = indicator.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = leds.set_both(color, hold) {
        warn!(error = %e, ?color, "indicator update failed");
    }
}
