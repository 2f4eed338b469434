//! `hammer-runtime` – the behavior core
//!
//! Turns discrete voice commands into continuous robot behavior while two
//! background loops watch for obstacles and wander inside a bounded zone.
//!
//! # Modules
//!
//! - [`tracker`] – [`Tracker`]: heading and grid position, zone checks.
//! - [`state`] – [`RobotState`] behind one mutex in [`SharedState`].
//! - [`dispatcher`] – [`Dispatcher`]: direction → drive motion + heading.
//! - [`obstacle_watch`] – [`ObstacleWatch`]: debounced proximity alarm.
//! - [`patrol`] – [`PatrolLoop`]: bounded random walk.
//! - [`coordinator`] – [`Coordinator`]: command handling and loop wiring.
//! - [`config`] – [`BehaviorConfig`]: timing and geometry.
//! - [`shutdown`] – cooperative stop signal for the loops.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing].

pub mod config;
pub mod coordinator;
pub mod dispatcher;
pub mod indicate;
pub mod obstacle_watch;
pub mod patrol;
pub mod shutdown;
pub mod state;
pub mod telemetry;
pub mod tracker;

pub use config::BehaviorConfig;
pub use coordinator::{BackgroundLoops, Coordinator, RunningCoordinator};
pub use dispatcher::Dispatcher;
pub use obstacle_watch::{BreachDebouncer, ObstacleWatch, WatchTick};
pub use patrol::{PatrolLoop, PatrolMove};
pub use state::{RobotState, SharedState};
pub use tracker::Tracker;
