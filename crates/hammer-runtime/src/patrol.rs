//! [`PatrolLoop`] – bounded random walk inside the patrol zone.
//!
//! Each iteration, while patrol is active and the obstacle watch is armed:
//!
//! 1. draw a direction from forward/left/right, 2 or 3 steps, and 40 % or
//!    60 % speed;
//! 2. redraw until the move stays inside the zone;
//! 3. commit the new position and dispatch the move;
//! 4. sleep roughly as long as the motors need to travel.
//!
//! Steps 2 and 3 run under a single state lock, so an external command can
//! not move the robot between the zone check and the commit.  The dispatch
//! itself happens after the lock is released: a breach detected right after
//! the commit does not undo it, only the next iteration is suppressed.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use hammer_types::{MoveCommand, PatrolDirection, Position};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::dispatcher::Dispatcher;
use crate::shutdown::Shutdown;
use crate::state::SharedState;
use crate::tracker::Tracker;

/// Steps per patrol move.
const PATROL_STEPS: RangeInclusive<u32> = 2..=3;

/// One candidate patrol move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatrolMove {
    pub direction: PatrolDirection,
    pub steps: u32,
    pub speed: i32,
}

impl PatrolMove {
    /// Uniformly draw direction, steps (2–3) and speed (40 or 60).
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let direction = PatrolDirection::ALL[rng.gen_range(0..PatrolDirection::ALL.len())];
        Self {
            direction,
            steps: rng.gen_range(PATROL_STEPS),
            speed: rng.gen_range(2..=3) * 20,
        }
    }

    /// Approximate motor travel time: `2 + steps * (100 - speed) / 75`
    /// seconds.
    pub fn travel_time(&self) -> Duration {
        let secs = 2.0 + f64::from(self.steps) * f64::from(100 - self.speed) / 75.0;
        Duration::from_secs_f64(secs.max(0.0))
    }

    pub fn command(&self) -> MoveCommand {
        MoveCommand::new(self.direction.into(), self.steps, self.speed)
    }
}

pub struct PatrolLoop<R> {
    dispatcher: Arc<Dispatcher>,
    state: SharedState,
    rng: R,
    idle_interval: Duration,
}

impl<R: Rng + Send> PatrolLoop<R> {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        state: SharedState,
        rng: R,
        idle_interval: Duration,
    ) -> Self {
        Self {
            dispatcher,
            state,
            rng,
            idle_interval,
        }
    }

    /// Draw, validate and commit a move in one critical section.  Returns
    /// `None` when patrol is gated off or no move fits in the zone.
    fn plan(&mut self) -> Option<(PatrolMove, Position)> {
        let rng = &mut self.rng;
        self.state.with(|s| {
            if !s.patrol_allowed() {
                return None;
            }
            if !has_move_in_zone(&s.tracker) {
                warn!(
                    position = %s.tracker.position(),
                    zone_radius = s.tracker.zone_radius(),
                    "no patrol move fits in the zone"
                );
                return None;
            }
            // At least one candidate fits, so the redraw ends.
            loop {
                let candidate = PatrolMove::draw(&mut *rng);
                if s.tracker.would_leave_zone(candidate.direction, candidate.steps) {
                    debug!(?candidate, "candidate leaves zone; redrawing");
                    continue;
                }
                if let Some(position) =
                    s.tracker.commit_move(candidate.direction, candidate.steps)
                {
                    return Some((candidate, position));
                }
            }
        })
    }

    /// Run one iteration with a random candidate.  Returns the dispatched
    /// move, or `None` when gated off or boxed in.
    pub fn step(&mut self) -> Option<PatrolMove> {
        let (mv, position) = self.plan()?;
        info!(
            direction = ?mv.direction,
            steps = mv.steps,
            speed = mv.speed,
            %position,
            "patrol move"
        );
        self.dispatcher.execute(mv.command());
        Some(mv)
    }

    /// Run one iteration with a caller-chosen candidate.  Nothing happens
    /// when patrol is gated off or the candidate would leave the zone.
    pub fn step_with(&self, candidate: PatrolMove) -> Option<Position> {
        let position = self.state.with(|s| {
            if !s.patrol_allowed() {
                return None;
            }
            s.tracker.commit_move(candidate.direction, candidate.steps)
        })?;
        info!(
            direction = ?candidate.direction,
            steps = candidate.steps,
            speed = candidate.speed,
            %position,
            "patrol move"
        );
        self.dispatcher.execute(candidate.command());
        Some(position)
    }

    /// Wander until `shutdown` fires.
    pub async fn run(mut self, mut shutdown: Shutdown) {
        info!("patrol loop started");
        loop {
            let delay = match self.step() {
                Some(mv) => mv.travel_time(),
                None => self.idle_interval,
            };
            if shutdown.sleep(delay).await {
                break;
            }
        }
        info!("patrol loop stopped");
    }
}

/// Whether any forward/left/right move of an allowed length stays inside
/// the zone.
fn has_move_in_zone(tracker: &Tracker) -> bool {
    PatrolDirection::ALL
        .into_iter()
        .any(|direction| PATROL_STEPS.any(|steps| !tracker.would_leave_zone(direction, steps)))
}
