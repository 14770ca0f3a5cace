// SPDX-FileCopyrightText: 2026 Banter Contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Heartbeat Monitor
//!
//! Detects silent connection death. While the connection is open, two
//! independent periodic tasks run: one emits outbound pings, the other
//! compares the time since the last received heartbeat against the
//! interval plus a grace period and counts misses. Reaching the miss
//! budget declares the connection stale exactly once; further checks are
//! suppressed until the monitor is restarted on the next open.

use std::time::{Duration, Instant};

use super::timer::PeriodicTask;

/// Liveness configuration. These are the knobs, not magic numbers.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Interval between outbound pings and between staleness checks.
    pub interval: Duration,
    /// Extra slack added to the interval before a check counts a miss.
    pub grace: Duration,
    /// Consecutive misses before the connection is declared stale.
    pub max_missed: u32,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        HeartbeatConfig {
            interval: Duration::from_secs(30),
            grace: Duration::from_secs(5),
            max_missed: 3,
        }
    }
}

/// Outcome of a staleness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessCheck {
    /// No check was due, or the peer is within its deadline.
    Alive,
    /// A check fired and counted a miss, but the budget is not exhausted.
    Missed(u32),
    /// The miss budget is exhausted. Reported exactly once per session.
    Stale,
}

/// Tracks connection liveness for one open session.
#[derive(Debug)]
pub struct HeartbeatMonitor {
    config: HeartbeatConfig,
    send_task: PeriodicTask,
    check_task: PeriodicTask,
    last_received: Option<Instant>,
    missed: u32,
    stale_reported: bool,
}

impl HeartbeatMonitor {
    pub fn new(config: HeartbeatConfig) -> Self {
        let send_task = PeriodicTask::new(config.interval);
        let check_task = PeriodicTask::new(config.interval);
        HeartbeatMonitor {
            config,
            send_task,
            check_task,
            last_received: None,
            missed: 0,
            stale_reported: false,
        }
    }

    /// Starts both timers for a freshly opened connection.
    pub fn start(&mut self, now: Instant) {
        self.send_task.start(now);
        self.check_task.start(now);
        self.last_received = Some(now);
        self.missed = 0;
        self.stale_reported = false;
    }

    /// Cancels both timers. Called on every transition out of open.
    pub fn stop(&mut self) {
        self.send_task.cancel();
        self.check_task.cancel();
    }

    /// Returns true while both timers are armed.
    pub fn is_running(&self) -> bool {
        self.send_task.is_running() && self.check_task.is_running()
    }

    /// Records a received heartbeat (ping or pong alike).
    pub fn observe_heartbeat(&mut self, now: Instant) {
        self.last_received = Some(now);
        self.missed = 0;
    }

    /// Returns true when an outbound ping is due.
    pub fn poll_send(&mut self, now: Instant) -> bool {
        self.send_task.fire_if_due(now)
    }

    /// Runs the staleness check if it is due.
    pub fn poll_check(&mut self, now: Instant) -> LivenessCheck {
        if !self.check_task.fire_if_due(now) || self.stale_reported {
            return LivenessCheck::Alive;
        }

        let deadline = self.config.interval + self.config.grace;
        let silent_for = match self.last_received {
            Some(last) => now.saturating_duration_since(last),
            None => deadline + Duration::from_millis(1),
        };

        if silent_for <= deadline {
            return LivenessCheck::Alive;
        }

        self.missed += 1;
        if self.missed >= self.config.max_missed {
            self.stale_reported = true;
            LivenessCheck::Stale
        } else {
            LivenessCheck::Missed(self.missed)
        }
    }

    /// Consecutive misses so far.
    pub fn missed_count(&self) -> u32 {
        self.missed
    }
}

// INLINE_TEST_REQUIRED: Tests private missed/stale_reported state transitions
#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> HeartbeatConfig {
        HeartbeatConfig {
            interval: Duration::from_secs(30),
            grace: Duration::from_secs(5),
            max_missed: 3,
        }
    }

    #[test]
    fn test_no_checks_before_start() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());

        assert!(!monitor.poll_send(now + Duration::from_secs(120)));
        assert_eq!(
            monitor.poll_check(now + Duration::from_secs(120)),
            LivenessCheck::Alive
        );
    }

    #[test]
    fn test_send_due_every_interval() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());
        monitor.start(now);

        assert!(!monitor.poll_send(now + Duration::from_secs(29)));
        assert!(monitor.poll_send(now + Duration::from_secs(30)));
        assert!(!monitor.poll_send(now + Duration::from_secs(31)));
    }

    #[test]
    fn test_heartbeat_resets_missed_count() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());
        monitor.start(now);

        // First check: silent past interval+grace, one miss
        let t1 = now + Duration::from_secs(36);
        assert_eq!(monitor.poll_check(t1), LivenessCheck::Missed(1));

        // Heartbeat arrives, counter resets
        let t2 = now + Duration::from_secs(40);
        monitor.observe_heartbeat(t2);
        assert_eq!(monitor.missed_count(), 0);

        // Next check within the deadline of t2: alive
        let t3 = now + Duration::from_secs(67);
        assert_eq!(monitor.poll_check(t3), LivenessCheck::Alive);
    }

    #[test]
    fn test_stale_declared_once() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());
        monitor.start(now);

        let mut t = now;
        let mut stale_count = 0;
        for _ in 0..6 {
            t += Duration::from_secs(36);
            if monitor.poll_check(t) == LivenessCheck::Stale {
                stale_count += 1;
            }
        }
        assert_eq!(stale_count, 1);
    }

    #[test]
    fn test_restart_clears_stale_latch() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());
        monitor.start(now);

        let mut t = now;
        for _ in 0..3 {
            t += Duration::from_secs(36);
            monitor.poll_check(t);
        }
        assert_eq!(monitor.missed_count(), 3);

        monitor.stop();
        monitor.start(t);
        assert_eq!(monitor.missed_count(), 0);
        assert_eq!(
            monitor.poll_check(t + Duration::from_secs(30)),
            LivenessCheck::Alive
        );
    }

    #[test]
    fn test_stop_cancels_both_timers() {
        let now = Instant::now();
        let mut monitor = HeartbeatMonitor::new(fast_config());
        monitor.start(now);
        monitor.stop();

        assert!(!monitor.is_running());
        assert!(!monitor.poll_send(now + Duration::from_secs(300)));
        assert_eq!(
            monitor.poll_check(now + Duration::from_secs(300)),
            LivenessCheck::Alive
        );
    }
}
