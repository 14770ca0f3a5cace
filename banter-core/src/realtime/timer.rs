//! Scheduled Task Primitives
//!
//! Deadline-based cancellable tasks driven by explicit `Instant`s from the
//! caller's event loop. Nothing here spawns threads or sleeps; the owner
//! polls `fire_if_due` on each tick, which keeps liveness logic fully
//! deterministic under test.

use std::time::{Duration, Instant};

/// A task that fires at most once after being scheduled.
#[derive(Debug, Default)]
pub struct OneShotTask {
    deadline: Option<Instant>,
}

impl OneShotTask {
    pub fn new() -> Self {
        OneShotTask { deadline: None }
    }

    /// Schedules the task to fire `delay` after `now`, replacing any
    /// previously scheduled deadline.
    pub fn schedule_in(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Cancels the pending deadline. Safe to call when not scheduled.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once when the deadline has passed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A task that fires repeatedly at a fixed period until cancelled.
#[derive(Debug)]
pub struct PeriodicTask {
    period: Duration,
    next: Option<Instant>,
}

impl PeriodicTask {
    pub fn new(period: Duration) -> Self {
        PeriodicTask { period, next: None }
    }

    /// Starts the period, first firing one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(now + self.period);
    }

    /// Stops the task until the next `start`.
    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true when a period has elapsed and advances the deadline.
    ///
    /// The next deadline is anchored to `now` rather than the missed
    /// deadline, so a stalled event loop does not produce a burst of
    /// catch-up firings.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.next {
            Some(next) if now >= next => {
                self.next = Some(now + self.period);
                true
            }
            _ => false,
        }
    }
}
