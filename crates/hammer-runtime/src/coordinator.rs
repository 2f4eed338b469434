//! [`Coordinator`] – composes the tracker, dispatcher, obstacle watch and
//! patrol loop around one [`SharedState`].
//!
//! External commands are handled synchronously on the caller's task and are
//! always allowed, even mid-patrol.  The two background loops run as Tokio
//! tasks (see [`Coordinator::spawn`]) and arbitrate through the shared flags:
//!
//! | command | effect |
//! |---|---|
//! | `move` | re-arm the watch, dispatch the move (heading only) |
//! | `stop` | cut power, clear patrol, re-arm the watch |
//! | `patrol` | set patrol active, re-arm the watch |
//! | `smash` | swing the implement, settle, notify, re-arm the watch |
//!
//! # Known race
//!
//! A patrol move committed to the tracker just before the watch detects a
//! breach is not rolled back; only the next patrol iteration is suppressed.

use std::sync::{Arc, Mutex, PoisonError};

use hammer_hal::{Color, Hardware, Hold, Implement};
use hammer_middleware::NotificationSink;
use hammer_types::{Command, HammerError, MoveCommand, Notification};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::BehaviorConfig;
use crate::dispatcher::Dispatcher;
use crate::indicate::{self, SharedIndicator, flash_both};
use crate::obstacle_watch::ObstacleWatch;
use crate::patrol::PatrolLoop;
use crate::shutdown::{self, ShutdownTrigger};
use crate::state::{RobotState, SharedState};

/// Implement swing: strike, then retract.
const SMASH_STRIKE_SPEED: i32 = 100;
const SMASH_RETRACT_SPEED: i32 = -50;
const SMASH_DEGREES: f32 = 300.0;

/// The two perpetual activities, ready to be driven.
pub struct BackgroundLoops {
    pub watch: ObstacleWatch,
    pub patrol: PatrolLoop<StdRng>,
}

pub struct Coordinator {
    config: BehaviorConfig,
    state: SharedState,
    dispatcher: Arc<Dispatcher>,
    implement: Mutex<Box<dyn Implement>>,
    indicator: SharedIndicator,
    sink: Arc<dyn NotificationSink>,
}

impl Coordinator {
    /// Wire the core with an entropy-seeded patrol RNG.
    pub fn new(
        config: BehaviorConfig,
        hardware: Hardware,
        sink: Arc<dyn NotificationSink>,
    ) -> (Self, BackgroundLoops) {
        Self::with_rng(config, hardware, sink, StdRng::from_entropy())
    }

    /// Wire the core with a seeded patrol RNG, for reproducible runs.
    pub fn with_seed(
        config: BehaviorConfig,
        hardware: Hardware,
        sink: Arc<dyn NotificationSink>,
        seed: u64,
    ) -> (Self, BackgroundLoops) {
        Self::with_rng(config, hardware, sink, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        config: BehaviorConfig,
        hardware: Hardware,
        sink: Arc<dyn NotificationSink>,
        rng: StdRng,
    ) -> (Self, BackgroundLoops) {
        let config = config.validated();
        let Hardware {
            drive,
            implement,
            range,
            indicator,
        } = hardware;

        let state = SharedState::new(RobotState::new(config.zone_radius));
        let dispatcher = Arc::new(Dispatcher::new(drive, state.clone(), &config));
        let indicator = indicate::shared(indicator);

        let watch = ObstacleWatch::new(
            range,
            dispatcher.clone(),
            state.clone(),
            sink.clone(),
            indicator.clone(),
            &config,
        );
        let patrol = PatrolLoop::new(
            dispatcher.clone(),
            state.clone(),
            rng,
            config.idle_interval(),
        );

        let coordinator = Self {
            config,
            state,
            dispatcher,
            implement: Mutex::new(implement),
            indicator,
            sink,
        };
        (coordinator, BackgroundLoops { watch, patrol })
    }

    /// Wire the core and start both background loops on the current Tokio
    /// runtime.
    pub fn spawn(
        config: BehaviorConfig,
        hardware: Hardware,
        sink: Arc<dyn NotificationSink>,
    ) -> RunningCoordinator {
        let (coordinator, loops) = Self::new(config, hardware, sink);
        coordinator.start(loops)
    }

    /// Start `loops` (as returned alongside `self`) on the current Tokio
    /// runtime.
    pub fn start(self, loops: BackgroundLoops) -> RunningCoordinator {
        let (trigger, shutdown) = shutdown::channel();
        let tasks = vec![
            tokio::spawn(loops.watch.run(shutdown.clone())),
            tokio::spawn(loops.patrol.run(shutdown)),
        ];
        info!("behavior loops running");
        RunningCoordinator {
            coordinator: Arc::new(self),
            trigger,
            tasks,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    pub fn snapshot(&self) -> RobotState {
        self.state.snapshot()
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    /// Decode a raw JSON directive and handle it.  Malformed directives are
    /// logged and dropped.
    pub async fn handle_directive(&self, raw: &str) {
        match Command::from_json(raw) {
            Ok(command) => self.handle(command).await,
            Err(e) => warn!(error = %e, directive = raw, "dropping directive"),
        }
    }

    /// Handle one external command.  Never fails; only `smash` suspends.
    pub async fn handle(&self, command: Command) {
        info!(?command, "command received");
        match command {
            Command::Move(mv) => {
                self.state.arm_watch();
                self.dispatcher.execute(mv);
            }
            Command::Stop => self.dispatcher.execute(MoveCommand::stop()),
            Command::Patrol => {
                self.state.with(|s| {
                    s.patrol_active = true;
                    s.watch_armed = true;
                });
                info!("patrol enabled");
            }
            Command::Smash => self.smash().await,
        }
    }

    async fn smash(&self) {
        {
            let mut implement = self
                .implement
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = swing(implement.as_mut()) {
                warn!(error = %e, "smash swing failed");
            }
        }
        tokio::time::sleep(self.config.smash_settle()).await;
        self.sink.emit(Notification::Smash { smashed: 1 });
        self.state.arm_watch();
        flash_both(&self.indicator, Color::Green, self.config.indicator_flash());
        info!("smashed; watch re-armed");
    }
}

fn swing(implement: &mut dyn Implement) -> Result<(), HammerError> {
    implement.run_for_degrees(SMASH_STRIKE_SPEED, SMASH_DEGREES)?;
    implement.run_for_degrees(SMASH_RETRACT_SPEED, SMASH_DEGREES)
}

/// A [`Coordinator`] whose loops are running.
pub struct RunningCoordinator {
    coordinator: Arc<Coordinator>,
    trigger: ShutdownTrigger,
    tasks: Vec<JoinHandle<()>>,
}

impl RunningCoordinator {
    pub fn coordinator(&self) -> &Arc<Coordinator> {
        &self.coordinator
    }

    /// Signal both loops, wait for them to exit, then cut drive power and
    /// switch the LEDs off.
    pub async fn shutdown(self) {
        self.trigger.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "behavior loop ended abnormally");
            }
        }
        self.coordinator.dispatcher.halt();
        indicate::set_both(&self.coordinator.indicator, Color::Black, Hold::Persistent);
        info!("behavior loops stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hammer_hal::sim::{DriveCall, ImplementCall, IndicatorCall, SimHardware, SimProbes};
    use hammer_middleware::RecordingSink;
    use hammer_types::{Direction, Heading, Position};
    use std::time::Duration;

    fn coordinator() -> (Coordinator, BackgroundLoops, Arc<RecordingSink>, SimProbes) {
        let (hw, probes) = SimHardware::new().build();
        let sink = Arc::new(RecordingSink::new());
        let (c, loops) = Coordinator::with_seed(BehaviorConfig::default(), hw, sink.clone(), 9);
        (c, loops, sink, probes)
    }

    #[tokio::test]
    async fn move_rearms_watch_and_turns() {
        let (c, _loops, _, _) = coordinator();
        c.state().disarm_watch();
        c.handle(Command::Move(MoveCommand::new(Direction::Right, 1, 50))).await;
        let snap = c.snapshot();
        assert!(snap.watch_armed);
        assert_eq!(snap.tracker.heading(), Heading::Right);
        assert_eq!(snap.tracker.position(), Position::ORIGIN);
    }

    #[tokio::test]
    async fn patrol_sets_both_flags() {
        let (c, _loops, _, _) = coordinator();
        c.state().disarm_watch();
        c.handle(Command::Patrol).await;
        assert!(c.snapshot().patrol_allowed());
    }

    #[tokio::test]
    async fn stop_kind_matches_stop_direction() {
        let (c, _loops, _, probes) = coordinator();
        c.handle(Command::Patrol).await;
        c.state().disarm_watch();
        c.handle(Command::Stop).await;
        let snap = c.snapshot();
        assert!(!snap.patrol_active);
        assert!(snap.watch_armed);
        assert_eq!(probes.drive.snapshot(), vec![DriveCall::Stop]);
    }

    #[tokio::test(start_paused = true)]
    async fn smash_swings_settles_notifies_and_rearms() {
        let (c, _loops, sink, probes) = coordinator();
        c.state().disarm_watch();
        c.handle(Command::Smash).await;

        assert_eq!(
            probes.implement.snapshot(),
            vec![
                ImplementCall {
                    speed: 100,
                    degrees: 300.0,
                },
                ImplementCall {
                    speed: -50,
                    degrees: 300.0,
                },
            ]
        );
        assert_eq!(sink.emitted(), vec![Notification::Smash { smashed: 1 }]);
        assert!(c.snapshot().watch_armed);
        assert!(probes.indicator.snapshot().iter().any(|call| matches!(
            call,
            IndicatorCall::Led {
                color: Color::Green,
                ..
            }
        )));
    }

    #[tokio::test(start_paused = true)]
    async fn smash_waits_for_settle_time() {
        let (c, _loops, sink, _) = coordinator();
        let c = Arc::new(c);
        let task = tokio::spawn({
            let c = c.clone();
            async move { c.handle(Command::Smash).await }
        });
        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(sink.emitted().is_empty());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.count("Smash"), 1);
        task.await.unwrap();
    }

    #[tokio::test]
    async fn malformed_directive_is_dropped() {
        let (c, _loops, _, probes) = coordinator();
        c.handle_directive(r#"{"type":"moveSteps","steps":2}"#).await;
        c.handle_directive("garbage").await;
        assert!(probes.drive.is_empty());
        assert_eq!(c.snapshot(), RobotState::new(3));

        // Later directives still work.
        c.handle_directive(r#"{"type":"moveSteps","direction":"left","steps":"1","speed":"50"}"#)
            .await;
        assert_eq!(c.snapshot().tracker.heading(), Heading::Left);
    }

    #[tokio::test]
    async fn unknown_direction_still_rearms_watch() {
        let (c, _loops, _, probes) = coordinator();
        c.state().disarm_watch();
        c.handle_directive(r#"{"type":"moveSteps","direction":"sideways"}"#).await;
        assert!(c.snapshot().watch_armed);
        assert!(probes.drive.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn spawned_loops_shut_down_and_halt_drive() {
        let (hw, probes) = SimHardware::new().build();
        let running = Coordinator::spawn(
            BehaviorConfig::default(),
            hw,
            Arc::new(RecordingSink::new()),
        );
        running.coordinator().handle(Command::Patrol).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(probes.drive.len() > 0);

        running.shutdown().await;
        assert_eq!(probes.drive.snapshot().last(), Some(&DriveCall::Stop));
        assert!(matches!(
            probes.indicator.snapshot().last(),
            Some(IndicatorCall::Led {
                color: Color::Black,
                hold: Hold::Persistent,
                ..
            })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn undersized_zone_is_replaced_and_stop_still_lands() {
        let (hw, probes) = SimHardware::new().build();
        let config = BehaviorConfig {
            zone_radius: 1,
            ..BehaviorConfig::default()
        };
        let running = Coordinator::spawn(config, hw, Arc::new(RecordingSink::new()));
        let c = running.coordinator().clone();
        assert_eq!(c.config().zone_radius, 3);
        assert_eq!(c.snapshot().tracker.zone_radius(), 3);

        c.handle(Command::Patrol).await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        c.handle(Command::Stop).await;
        assert!(!c.snapshot().patrol_active);
        assert!(probes.drive.snapshot().contains(&DriveCall::Stop));

        running.shutdown().await;
    }
}
