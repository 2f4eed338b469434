//! [`BehaviorConfig`] – timing and geometry knobs for the behavior core.
//!
//! Every field has a default, so a config file only needs to mention the
//! values it changes:
//!
//! ```toml
//! [behavior]
//! poll_interval_ms = 100
//! breach_distance = 25.0
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Smallest zone in which every pose still has a patrol move that fits.
pub const MIN_ZONE_RADIUS: i32 = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Obstacle watch sampling interval while armed.
    pub poll_interval_ms: u64,
    /// A sample strictly below this distance counts as a breach.
    pub breach_distance: f32,
    /// An alert fires once the consecutive-breach counter exceeds this.
    pub breach_debounce: u32,
    /// Pause after an alert before the watch polls again.
    pub alert_cooldown_ms: u64,
    /// Re-check interval for a loop that is currently gated off.
    pub idle_interval_ms: u64,
    /// Half-width of the patrol zone; coordinates stay in `[-r, r]`.
    pub zone_radius: i32,
    /// Differential rotation used for a pivot turn.
    pub turn_degrees: f32,
    /// Whether directional drives wait for the motion to finish.
    pub blocking_moves: bool,
    /// Wait after a smash swing before reporting it.
    pub smash_settle_ms: u64,
    /// How long the status LEDs stay lit after an alert or a smash.
    pub indicator_flash_ms: u64,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 200,
            breach_distance: 30.0,
            breach_debounce: 2,
            alert_cooldown_ms: 5_000,
            idle_interval_ms: 1_000,
            zone_radius: 3,
            turn_degrees: 490.0,
            blocking_moves: false,
            smash_settle_ms: 5_000,
            indicator_flash_ms: 1_000,
        }
    }
}

impl BehaviorConfig {
    /// Replace values the core cannot run with by their defaults.
    pub fn validated(mut self) -> Self {
        if self.zone_radius < MIN_ZONE_RADIUS {
            let fallback = Self::default().zone_radius;
            warn!(
                zone_radius = self.zone_radius,
                fallback, "zone radius too small to patrol; using default"
            );
            self.zone_radius = fallback;
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn alert_cooldown(&self) -> Duration {
        Duration::from_millis(self.alert_cooldown_ms)
    }

    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    pub fn smash_settle(&self) -> Duration {
        Duration::from_millis(self.smash_settle_ms)
    }

    pub fn indicator_flash(&self) -> Duration {
        Duration::from_millis(self.indicator_flash_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_robot_behavior() {
        let cfg = BehaviorConfig::default();
        assert_eq!(cfg.poll_interval(), Duration::from_millis(200));
        assert_eq!(cfg.alert_cooldown(), Duration::from_secs(5));
        assert_eq!(cfg.idle_interval(), Duration::from_secs(1));
        assert_eq!(cfg.zone_radius, 3);
        assert_eq!(cfg.breach_debounce, 2);
        assert!(!cfg.blocking_moves);
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let cfg: BehaviorConfig =
            toml::from_str("poll_interval_ms = 50\nblocking_moves = true").unwrap();
        assert_eq!(cfg.poll_interval_ms, 50);
        assert!(cfg.blocking_moves);
        assert_eq!(cfg.breach_distance, 30.0);
        assert_eq!(cfg.turn_degrees, 490.0);
    }

    #[test]
    fn undersized_zone_falls_back_to_default() {
        for radius in [-3, 0, 1] {
            let cfg = BehaviorConfig {
                zone_radius: radius,
                ..BehaviorConfig::default()
            };
            assert_eq!(cfg.validated().zone_radius, 3);
        }
        let cfg = BehaviorConfig {
            zone_radius: MIN_ZONE_RADIUS,
            ..BehaviorConfig::default()
        };
        assert_eq!(cfg.validated().zone_radius, MIN_ZONE_RADIUS);
    }
}
