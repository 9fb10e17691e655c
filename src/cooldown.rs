//! Cooldown gate between sessions
//!
//! Pure time arithmetic. Expiry has no external trigger, so consumers poll
//! this at least once a second while the wait is on screen.

use serde::{Deserialize, Serialize};

/// Result of asking whether a new session may start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownStatus {
    pub allowed: bool,
    pub remaining_ms: u64,
}

impl CooldownStatus {
    /// No prior session recorded
    pub const READY: CooldownStatus = CooldownStatus {
        allowed: true,
        remaining_ms: 0,
    };

    /// Whole seconds left, rounded up
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_ms.div_ceil(1000)
    }
}

/// Check the gate at `now_ms` given the last session's end time.
///
/// `remaining = max(0, cooldown - (now - last))`; a clock that reads
/// earlier than `last` counts as no time elapsed.
pub fn can_start(now_ms: u64, last_ms: u64, cooldown_ms: u64) -> CooldownStatus {
    let elapsed = now_ms.saturating_sub(last_ms);
    let remaining_ms = cooldown_ms.saturating_sub(elapsed);
    CooldownStatus {
        allowed: remaining_ms == 0,
        remaining_ms,
    }
}

/// Format seconds as `mm:ss` (minutes keep growing past 99)
pub fn format_mmss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
