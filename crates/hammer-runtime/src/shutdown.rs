//! Cooperative shutdown signal for the background loops.
//!
//! Each loop sleeps through [`Shutdown::sleep`], which wakes early when the
//! [`ShutdownTrigger`] fires, so shutdown is observed at the next suspension
//! point.

use std::time::Duration;

use tokio::sync::watch;

/// Sending half; fires the signal once.
#[derive(Debug)]
pub struct ShutdownTrigger(watch::Sender<bool>);

impl ShutdownTrigger {
    pub fn trigger(&self) {
        // `send_replace` succeeds even when every receiver is gone.
        self.0.send_replace(true);
    }
}

/// Receiving half, cloned into every loop.
#[derive(Debug, Clone)]
pub struct Shutdown(watch::Receiver<bool>);

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.0.borrow()
    }

    /// Sleep for `duration` or until shutdown, whichever comes first.
    /// Returns `true` when the caller should exit.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        if self.is_triggered() {
            return true;
        }
        tokio::select! {
            () = tokio::time::sleep(duration) => self.is_triggered(),
            changed = self.0.changed() => changed.is_err() || self.is_triggered(),
        }
    }
}

pub fn channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger(tx), Shutdown(rx))
}
