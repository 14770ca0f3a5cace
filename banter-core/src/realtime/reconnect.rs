//! Reconnection Policy
//!
//! Exponential backoff scheduler bounded by a maximum attempt count.
//! Owns one pending reconnect deadline at a time; a new explicit connect
//! to a different target cancels it so no stale reconnect fires against
//! an abandoned conversation.

use std::time::{Duration, Instant};

use super::error::{RealtimeError, RealtimeResult};
use super::timer::OneShotTask;

/// Backoff configuration.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Delay before the first retry; doubles per subsequent attempt.
    pub base_delay: Duration,
    /// Attempts before giving up and surfacing terminal failure.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay: Duration::from_millis(1_000),
            max_attempts: 5,
        }
    }
}

/// Bounded exponential backoff schedule.
#[derive(Debug)]
pub struct ReconnectSchedule {
    config: ReconnectConfig,
    attempt: u32,
    task: OneShotTask,
}

impl ReconnectSchedule {
    pub fn new(config: ReconnectConfig) -> Self {
        ReconnectSchedule {
            config,
            attempt: 0,
            task: OneShotTask::new(),
        }
    }

    /// Delay for a given attempt number (1-based): base * 2^(attempt-1).
    ///
    /// The exponent is capped so pathological attempt counts cannot
    /// overflow the shift.
    pub fn delay_for(attempt: u32, base: Duration) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        base * (1u32 << exponent)
    }

    /// Schedules the next attempt, incrementing the counter first.
    ///
    /// Returns the computed delay, or `MaxRetriesExceeded` once the
    /// attempt budget is exhausted.
    pub fn schedule(&mut self, now: Instant) -> RealtimeResult<Duration> {
        if self.attempt >= self.config.max_attempts {
            return Err(RealtimeError::MaxRetriesExceeded);
        }
        self.attempt += 1;
        let delay = Self::delay_for(self.attempt, self.config.base_delay);
        self.task.schedule_in(now, delay);
        Ok(delay)
    }

    /// Returns true exactly once when the scheduled delay has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        self.task.fire_if_due(now)
    }

    /// Clears the counter and any pending attempt. Called after a clean
    /// open and on explicit connects.
    pub fn reset(&mut self) {
        self.attempt = 0;
        self.task.cancel();
    }

    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn is_pending(&self) -> bool {
        self.task.is_scheduled()
    }
}
