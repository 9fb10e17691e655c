//! Apple Catch - the "catch the falling apples" mini-game core
//!
//! Core modules:
//! - `sim`: Deterministic session simulation (spawning, motion, collisions, score)
//! - `cooldown`: Time gate between sessions
//! - `reward`: Reward formula and settlement against the persisted store
//! - `game`: Session lifecycle controller tying the pieces together
//! - `persistence`: Injected key-value state store (memory, file, LocalStorage)
//! - `platform`: Browser/native platform abstraction (wall clock)
//! - `profile`: Player skin selection and the about-screen summary
//! - `tuning`: Data-driven game balance

pub mod cooldown;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod profile;
pub mod reward;
pub mod sim;
pub mod tuning;

pub use cooldown::{CooldownStatus, can_start, format_mmss};
pub use game::{MiniGame, StartError, TickReport};
pub use persistence::{MemoryStore, StateStore, StoreError};
pub use profile::{AppSummary, Skin};
pub use reward::{Settlement, reward_for_score, settle, settle_with_backlog};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Cooldown between sessions (10 minutes)
    pub const COOLDOWN_MS: u64 = 10 * 60 * 1000;
    /// Length of one session
    pub const SESSION_MS: u64 = 20_000;

    /// Play area height
    pub const AREA_HEIGHT: f32 = 380.0;
    /// Narrowest play area regardless of screen size
    pub const AREA_MIN_WIDTH: f32 = 260.0;
    /// Horizontal screen inset on each side of the play area
    pub const AREA_SIDE_INSET: f32 = 16.0;

    /// Spawn cadence
    pub const SPAWN_INTERVAL_MS: f32 = 550.0;
    /// Delay before the first spawn of a session
    pub const SPAWN_WARMUP_MS: f32 = 200.0;

    /// Falling object size range (diameter)
    pub const OBJECT_MIN_SIZE: f32 = 28.0;
    pub const OBJECT_MAX_SIZE: f32 = 56.0;
    /// Falling object speed range (units/second)
    pub const OBJECT_MIN_SPEED: f32 = 160.0;
    pub const OBJECT_MAX_SPEED: f32 = 300.0;
    /// Objects are dropped this far below the area bottom
    pub const EXIT_MARGIN: f32 = 40.0;

    /// Player box
    pub const PLAYER_WIDTH: f32 = 96.0;
    pub const PLAYER_HEIGHT: f32 = 96.0;
    /// Gap between player bottom and area bottom
    pub const EDGE_PAD: f32 = 8.0;
    /// Autopilot horizontal speed (units/second)
    pub const AUTOPILOT_SPEED: f32 = 420.0;
}

/// Clamp that tolerates an inverted range (returns the midpoint)
#[inline]
pub fn clamp_span(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        return (lo + hi) * 0.5;
    }
    value.clamp(lo, hi)
}
