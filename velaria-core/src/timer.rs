//! Countdown timer abstraction
//!
//! The control logic never sleeps; it arms a countdown and later
//! receives the expiry as a queued event. The trait keeps the logic
//! free of any clock so it runs identically under an async executor
//! and under host tests.

/// One restartable countdown.
///
/// `start` on a running timer restarts it from zero. Expiry is
/// delivered out of band (as a queued event), after which the timer
/// reads as inactive.
pub trait Timer {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_active(&self) -> bool;
}

/// Test timer fired by hand
#[derive(Debug, Default)]
pub struct ManualTimer {
    active: bool,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate expiry. Returns whether the timer was running, so a
    /// test harness can decide to deliver the expiry event.
    pub fn fire(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }
}

impl Timer for ManualTimer {
    fn start(&mut self) {
        self.active = true;
    }

    fn stop(&mut self) {
        self.active = false;
    }

    fn is_active(&self) -> bool {
        self.active
    }
}
