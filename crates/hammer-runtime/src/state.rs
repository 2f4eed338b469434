//! [`RobotState`] and its shared holder.
//!
//! The patrol loop, the obstacle watch and the command handler all read and
//! write the same flags.  They live behind a single mutex in
//! [`SharedState`]; every read-modify-write goes through
//! [`SharedState::with`] so it happens in one critical section.  The lock is
//! never held across an `.await`.

use std::sync::{Arc, Mutex, PoisonError};

use crate::tracker::Tracker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RobotState {
    /// The patrol loop should be generating moves.
    pub patrol_active: bool,
    /// `true` while the obstacle watch is actively looking and patrol moves
    /// are allowed; `false` while an alert is in progress.
    pub watch_armed: bool,
    pub tracker: Tracker,
}

impl RobotState {
    /// Start-up state: at the origin, facing forward, not patrolling, watch
    /// armed.
    pub fn new(zone_radius: i32) -> Self {
        Self {
            patrol_active: false,
            watch_armed: true,
            tracker: Tracker::new(zone_radius),
        }
    }

    /// An obstacle alert is in progress.
    pub fn alert_active(&self) -> bool {
        !self.watch_armed
    }

    /// The patrol loop may draw its next move.
    pub fn patrol_allowed(&self) -> bool {
        self.patrol_active && self.watch_armed
    }
}

/// Cheaply clonable handle to the one [`RobotState`] of the process.
#[derive(Debug, Clone)]
pub struct SharedState(Arc<Mutex<RobotState>>);

impl SharedState {
    pub fn new(state: RobotState) -> Self {
        Self(Arc::new(Mutex::new(state)))
    }

    /// Run `f` with exclusive access to the state.
    pub fn with<R>(&self, f: impl FnOnce(&mut RobotState) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn snapshot(&self) -> RobotState {
        self.with(|s| s.clone())
    }

    pub fn set_patrol_active(&self, active: bool) {
        self.with(|s| s.patrol_active = active);
    }

    pub fn arm_watch(&self) {
        self.with(|s| s.watch_armed = true);
    }

    /// Disarm the watch.  Returns whether it was armed before.
    pub fn disarm_watch(&self) -> bool {
        self.with(|s| std::mem::replace(&mut s.watch_armed, false))
    }

    pub fn watch_armed(&self) -> bool {
        self.with(|s| s.watch_armed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hammer_types::{Heading, Position};

    #[test]
    fn initial_state_is_armed_and_idle() {
        let s = RobotState::new(3);
        assert!(!s.patrol_active);
        assert!(s.watch_armed);
        assert!(!s.alert_active());
        assert!(!s.patrol_allowed());
        assert_eq!(s.tracker.heading(), Heading::Forward);
        assert_eq!(s.tracker.position(), Position::ORIGIN);
    }

    #[test]
    fn patrol_needs_both_flags() {
        let shared = SharedState::new(RobotState::new(3));
        shared.set_patrol_active(true);
        assert!(shared.snapshot().patrol_allowed());

        assert!(shared.disarm_watch());
        assert!(!shared.disarm_watch());
        let snap = shared.snapshot();
        assert!(snap.alert_active());
        assert!(!snap.patrol_allowed());

        shared.arm_watch();
        assert!(shared.watch_armed());
    }

    #[test]
    fn clones_share_one_state() {
        let a = SharedState::new(RobotState::new(3));
        let b = a.clone();
        b.with(|s| s.tracker.advance_heading(1));
        assert_eq!(a.snapshot().tracker.heading(), Heading::Right);
    }
}
