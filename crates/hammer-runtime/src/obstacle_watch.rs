//! [`ObstacleWatch`] – debounced proximity alarm.
//!
//! While the watch is armed it samples the range sensor every poll interval.
//! A sample below the breach distance increments a consecutive-breach
//! counter; anything else (including a failed read) resets it.  When the
//! counter exceeds the debounce count the watch:
//!
//! 1. disarms itself, which also suppresses the patrol loop,
//! 2. halts the drive,
//! 3. emits a `Proximity` notification with the measured distance,
//! 4. resets the counter and cools down before polling again.
//!
//! A disarmed watch idles until something re-arms it (a `stop`, any move
//! command, `patrol`, or a finished smash).

use std::sync::Arc;
use std::time::Duration;

use hammer_hal::{Color, RangeSensor};
use hammer_middleware::NotificationSink;
use hammer_types::Notification;
use tracing::{debug, info, warn};

use crate::config::BehaviorConfig;
use crate::dispatcher::Dispatcher;
use crate::indicate::{SharedIndicator, flash_both};
use crate::shutdown::Shutdown;
use crate::state::SharedState;

// ────────────────────────────────────────────────────────────────────────────
// Debounce
// ────────────────────────────────────────────────────────────────────────────

/// Consecutive-breach counter.  A single noisy sample never raises an
/// alert.
#[derive(Debug, Clone)]
pub struct BreachDebouncer {
    breach_distance: f32,
    debounce: u32,
    count: u32,
}

impl BreachDebouncer {
    pub fn new(breach_distance: f32, debounce: u32) -> Self {
        Self {
            breach_distance,
            debounce,
            count: 0,
        }
    }

    /// Feed one sample (`None` for a failed read).  Returns `true` when this
    /// sample completes a sustained breach; the counter is reset in that
    /// case.
    pub fn observe(&mut self, sample: Option<f32>) -> bool {
        match sample {
            Some(distance) if distance < self.breach_distance => self.count += 1,
            _ => self.count = 0,
        }
        if self.count > self.debounce {
            self.count = 0;
            return true;
        }
        false
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Watch loop
// ────────────────────────────────────────────────────────────────────────────

/// Outcome of a single [`ObstacleWatch::poll`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WatchTick {
    /// The watch is disarmed; nothing was sampled.
    Disarmed,
    /// Sampled, no alert.
    Clear,
    /// Sampled and raised an alert.
    Breach { distance: f32 },
}

pub struct ObstacleWatch {
    sensor: Box<dyn RangeSensor>,
    debouncer: BreachDebouncer,
    dispatcher: Arc<Dispatcher>,
    state: SharedState,
    sink: Arc<dyn NotificationSink>,
    indicator: SharedIndicator,
    poll_interval: Duration,
    cooldown: Duration,
    idle_interval: Duration,
    flash: Duration,
}

impl ObstacleWatch {
    pub fn new(
        sensor: Box<dyn RangeSensor>,
        dispatcher: Arc<Dispatcher>,
        state: SharedState,
        sink: Arc<dyn NotificationSink>,
        indicator: SharedIndicator,
        config: &BehaviorConfig,
    ) -> Self {
        Self {
            sensor,
            debouncer: BreachDebouncer::new(config.breach_distance, config.breach_debounce),
            dispatcher,
            state,
            sink,
            indicator,
            poll_interval: config.poll_interval(),
            cooldown: config.alert_cooldown(),
            idle_interval: config.idle_interval(),
            flash: config.indicator_flash(),
        }
    }

    /// Run one watch iteration without sleeping.
    pub fn poll(&mut self) -> WatchTick {
        if !self.state.watch_armed() {
            self.debouncer.reset();
            return WatchTick::Disarmed;
        }

        let sample = match self.sensor.sample_distance() {
            Ok(distance) => Some(distance),
            Err(e) => {
                warn!(
                    sensor = %self.sensor.id(),
                    error = %e,
                    "range sample failed; treating as clear"
                );
                None
            }
        };

        let breached = self.debouncer.observe(sample);
        match sample {
            Some(distance) if breached => {
                self.raise_alert(distance);
                WatchTick::Breach { distance }
            }
            _ => {
                debug!(?sample, streak = self.debouncer.count(), "proximity sample");
                WatchTick::Clear
            }
        }
    }

    fn raise_alert(&self, distance: f32) {
        info!(distance, "proximity breached; halting and notifying");
        // Disarm before halting: patrol must not plan a new move while the
        // halt waits for the drive.
        self.state.disarm_watch();
        flash_both(&self.indicator, Color::Red, self.flash);
        self.dispatcher.halt();
        self.sink.emit(Notification::Proximity { distance });
    }

    /// Poll forever, until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: Shutdown) {
        info!("obstacle watch started");
        loop {
            let delay = match self.poll() {
                WatchTick::Disarmed => self.idle_interval,
                WatchTick::Clear => self.poll_interval,
                WatchTick::Breach { .. } => self.cooldown + self.poll_interval,
            };
            if shutdown.sleep(delay).await {
                break;
            }
        }
        info!("obstacle watch stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hammer_hal::DriveDevice;
    use hammer_hal::sim::{DriveCall, IndicatorCall, SimHardware, SimProbes};
    use hammer_middleware::RecordingSink;
    use hammer_types::{HammerError, Position};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::{Mutex, mpsc};

    use crate::indicate;
    use crate::patrol::PatrolLoop;
    use crate::shutdown;
    use crate::state::RobotState;

    #[test]
    fn single_breach_then_clear_does_not_alert() {
        let mut d = BreachDebouncer::new(30.0, 2);
        assert!(!d.observe(Some(10.0)));
        assert!(!d.observe(Some(50.0)));
        assert_eq!(d.count(), 0);
    }

    #[test]
    fn third_consecutive_breach_alerts_once() {
        let mut d = BreachDebouncer::new(30.0, 2);
        assert!(!d.observe(Some(10.0)));
        assert!(!d.observe(Some(10.0)));
        assert!(d.observe(Some(10.0)));
        assert_eq!(d.count(), 0);
        assert!(!d.observe(Some(10.0)));
    }

    #[test]
    fn threshold_is_strict_and_failures_reset() {
        let mut d = BreachDebouncer::new(30.0, 2);
        d.observe(Some(29.9));
        d.observe(Some(29.9));
        assert!(!d.observe(Some(30.0)));
        d.observe(Some(1.0));
        d.observe(Some(1.0));
        assert!(!d.observe(None));
        assert_eq!(d.count(), 0);
    }

    struct Fixture {
        watch: ObstacleWatch,
        state: SharedState,
        sink: Arc<RecordingSink>,
        probes: SimProbes,
    }

    fn fixture() -> Fixture {
        let config = BehaviorConfig::default();
        let (hw, probes) = SimHardware::new().build();
        let state = SharedState::new(RobotState::new(config.zone_radius));
        let dispatcher = Arc::new(Dispatcher::new(hw.drive, state.clone(), &config));
        let sink = Arc::new(RecordingSink::new());
        let watch = ObstacleWatch::new(
            hw.range,
            dispatcher,
            state.clone(),
            sink.clone(),
            indicate::shared(hw.indicator),
            &config,
        );
        Fixture {
            watch,
            state,
            sink,
            probes,
        }
    }

    #[test]
    fn sustained_breach_halts_disarms_and_notifies() {
        let mut f = fixture();
        f.state.set_patrol_active(true);
        f.probes.range.push_repeated(10.0, 3);

        assert_eq!(f.watch.poll(), WatchTick::Clear);
        assert_eq!(f.watch.poll(), WatchTick::Clear);
        assert_eq!(f.watch.poll(), WatchTick::Breach { distance: 10.0 });

        let snap = f.state.snapshot();
        assert!(snap.patrol_active, "patrol flag is left alone");
        assert!(snap.alert_active());
        assert_eq!(f.sink.emitted(), vec![Notification::Proximity { distance: 10.0 }]);
        assert_eq!(f.probes.drive.snapshot(), vec![DriveCall::Stop]);
        assert!(f.probes.indicator.snapshot().iter().all(|c| matches!(
            c,
            IndicatorCall::Led {
                color: Color::Red,
                ..
            }
        )));

        // Disarmed: further polls do not sample.
        f.probes.range.push_repeated(10.0, 3);
        for _ in 0..3 {
            assert_eq!(f.watch.poll(), WatchTick::Disarmed);
        }
        assert_eq!(f.probes.range.pending(), 3);
        assert_eq!(f.sink.count("Proximity"), 1);
    }

    #[test]
    fn sensor_failure_breaks_the_streak() {
        let mut f = fixture();
        f.probes.range.push_repeated(10.0, 2);
        f.probes.range.push_failure();
        f.probes.range.push(10.0);
        for _ in 0..4 {
            assert_eq!(f.watch.poll(), WatchTick::Clear);
        }
        assert!(f.state.watch_armed());
        assert!(f.sink.emitted().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_alerts_and_exits_on_shutdown() {
        let f = fixture();
        f.probes.range.push_repeated(5.0, 3);
        let (trigger, shutdown) = shutdown::channel();
        let task = tokio::spawn(f.watch.run(shutdown));

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(f.sink.count("Proximity"), 1);
        assert!(f.state.snapshot().alert_active());

        trigger.trigger();
        task.await.unwrap();
    }

    /// Drive whose `stop` announces itself and then blocks until released.
    struct LatchedStopDrive {
        calls: Arc<Mutex<Vec<&'static str>>>,
        stopping: mpsc::Sender<()>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl DriveDevice for LatchedStopDrive {
        fn id(&self) -> &str {
            "latched"
        }

        fn drive_rotations(&mut self, _: i32, _: i32, _: f32, _: bool) -> Result<(), HammerError> {
            self.calls.lock().unwrap().push("rotations");
            Ok(())
        }

        fn drive_degrees(&mut self, _: i32, _: i32, _: f32, _: bool) -> Result<(), HammerError> {
            self.calls.lock().unwrap().push("degrees");
            Ok(())
        }

        fn stop(&mut self) -> Result<(), HammerError> {
            self.calls.lock().unwrap().push("stop");
            let _ = self.stopping.send(());
            let _ = self.release.lock().unwrap().recv();
            Ok(())
        }
    }

    #[test]
    fn patrol_cannot_move_while_alert_halt_is_in_flight() {
        let config = BehaviorConfig::default();
        let (hw, probes) = SimHardware::new().build();
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (stopping_tx, stopping_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let drive = LatchedStopDrive {
            calls: calls.clone(),
            stopping: stopping_tx,
            release: Mutex::new(release_rx),
        };

        let state = SharedState::new(RobotState::new(config.zone_radius));
        state.set_patrol_active(true);
        let dispatcher = Arc::new(Dispatcher::new(Box::new(drive), state.clone(), &config));
        let mut watch = ObstacleWatch::new(
            hw.range,
            dispatcher.clone(),
            state.clone(),
            Arc::new(RecordingSink::new()),
            indicate::shared(hw.indicator),
            &config,
        );
        let mut patrol = PatrolLoop::new(
            dispatcher,
            state.clone(),
            StdRng::seed_from_u64(4),
            config.idle_interval(),
        );

        probes.range.push_repeated(10.0, 3);
        let watcher = std::thread::spawn(move || (0..3).map(|_| watch.poll()).last());

        // The halt is now holding the drive.
        stopping_rx.recv().unwrap();
        assert!(state.snapshot().alert_active());
        assert_eq!(patrol.step(), None);

        release_tx.send(()).unwrap();
        assert_eq!(
            watcher.join().unwrap(),
            Some(WatchTick::Breach { distance: 10.0 })
        );
        assert_eq!(*calls.lock().unwrap(), vec!["stop"]);
        assert_eq!(state.snapshot().tracker.position(), Position::ORIGIN);
    }
}
