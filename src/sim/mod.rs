//! Deterministic session simulation
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only enters through tick deltas and explicit `now` values
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod clock;
pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::SessionClock;
pub use collision::{Aabb, player_catches};
pub use spawn::Spawner;
pub use state::{FallingObject, GameEvent, PlayArea, Player, SessionPhase, SessionState};
pub use tick::{TickInput, accumulate_score, tick};
