//! Session countdown
//!
//! Remaining time is always derived from wall-clock elapsed time since the
//! session started, so slow or dropped frames never stretch a session.

use serde::{Deserialize, Serialize};

use super::state::SessionPhase;

/// Fixed-length countdown driving the session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    pub phase: SessionPhase,
    /// Wall-clock start of the running session (ms since epoch)
    pub started_at_ms: Option<u64>,
    pub duration_ms: u64,
}

impl SessionClock {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            phase: SessionPhase::Idle,
            started_at_ms: None,
            duration_ms,
        }
    }

    /// Idle -> Running. Returns false if a session is already in progress.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.phase = SessionPhase::Running;
        self.started_at_ms = Some(now_ms);
        true
    }

    /// Milliseconds since start (0 when not running)
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match (self.phase, self.started_at_ms) {
            (SessionPhase::Running, Some(start)) => now_ms.saturating_sub(start),
            _ => 0,
        }
    }

    /// Milliseconds left; full duration when idle, zero once ended
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.phase {
            SessionPhase::Idle => self.duration_ms,
            SessionPhase::Running => self.duration_ms.saturating_sub(self.elapsed_ms(now_ms)),
            SessionPhase::Ended => 0,
        }
    }

    /// Whole seconds left, rounded up
    pub fn remaining_secs(&self, now_ms: u64) -> u64 {
        self.remaining_ms(now_ms).div_ceil(1000)
    }

    /// Running -> Ended once the duration has elapsed.
    /// Returns true only on the tick the transition happens.
    pub fn update(&mut self, now_ms: u64) -> bool {
        if self.phase == SessionPhase::Running && self.elapsed_ms(now_ms) >= self.duration_ms {
            self.phase = SessionPhase::Ended;
            return true;
        }
        false
    }

    /// Running -> Ended immediately (session abandoned)
    pub fn stop(&mut self) -> bool {
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Ended;
            return true;
        }
        false
    }

    /// Ended -> Idle once settlement has completed
    pub fn reset(&mut self) {
        self.phase = SessionPhase::Idle;
        self.started_at_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remaining_secs_rounds_up() {
        let mut clock = SessionClock::new(20_000);
        assert_eq!(clock.remaining_secs(0), 20);

        assert!(clock.start(1_000));
        assert_eq!(clock.remaining_secs(1_000), 20);
        assert_eq!(clock.remaining_secs(1_001), 20);
        assert_eq!(clock.remaining_secs(2_000), 19);
        assert_eq!(clock.remaining_secs(20_999), 1);
        assert_eq!(clock.remaining_secs(21_000), 0);
    }

    #[test]
    fn test_ends_exactly_once() {
        let mut clock = SessionClock::new(20_000);
        clock.start(0);

        assert!(!clock.update(19_999));
        assert_eq!(clock.phase, SessionPhase::Running);
        assert!(clock.update(20_000));
        assert_eq!(clock.phase, SessionPhase::Ended);
        assert!(!clock.update(25_000));
        assert_eq!(clock.remaining_secs(25_000), 0);
    }

    #[test]
    fn test_cannot_restart_until_reset() {
        let mut clock = SessionClock::new(1_000);
        assert!(clock.start(0));
        assert!(!clock.start(10));
        clock.update(1_000);
        assert!(!clock.start(2_000));

        clock.reset();
        assert_eq!(clock.phase, SessionPhase::Idle);
        assert!(clock.start(3_000));
    }

    #[test]
    fn test_clock_going_backwards_counts_as_no_elapsed_time() {
        let mut clock = SessionClock::new(20_000);
        clock.start(10_000);
        assert_eq!(clock.remaining_ms(5_000), 20_000);
        assert!(!clock.update(5_000));
    }

    #[test]
    fn test_stop() {
        let mut clock = SessionClock::new(20_000);
        assert!(!clock.stop());
        clock.start(0);
        assert!(clock.stop());
        assert_eq!(clock.phase, SessionPhase::Ended);
    }
}
