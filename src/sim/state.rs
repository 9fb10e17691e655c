//! Session state and core simulation types
//!
//! Everything a running session needs lives here. Entities exist only while
//! a session runs; the whole `SessionState` is dropped when it ends.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::spawn::Spawner;
use crate::clamp_span;
use crate::tuning::Tuning;

/// Current phase of the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionPhase {
    /// No session; waiting for the cooldown gate and a start request
    #[default]
    Idle,
    /// Objects are falling and the clock is counting down
    Running,
    /// Clock expired, settlement pending or done
    Ended,
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new object entered above the area
    Spawned { id: u32 },
    /// The player caught an object
    Caught { id: u32, value: u32 },
    /// An object fell out of the area uncaught
    Missed { id: u32 },
}

/// Bounding rectangle of the play field (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PlayArea {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area centred on a screen of the given width
    pub fn for_screen(screen_width: f32, tuning: &Tuning) -> Self {
        let width = tuning.area_width_for_screen(screen_width);
        Self::new((screen_width - width) / 2.0, 0.0, width, tuning.area_height)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// The player's catcher box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Centre of the box
    pub pos: Vec2,
    /// Full width and height
    pub size: Vec2,
}

impl Player {
    /// Player centred horizontally, resting just above the area bottom
    pub fn new(area: &PlayArea, tuning: &Tuning) -> Self {
        let size = Vec2::new(tuning.player_width, tuning.player_height);
        let pos = Vec2::new(
            area.x + area.width / 2.0,
            area.bottom() - tuning.edge_pad - size.y / 2.0,
        );
        Self { pos, size }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    /// Horizontal range the player centre may occupy
    pub fn x_range(&self, area: &PlayArea) -> (f32, f32) {
        let half = self.size.x / 2.0;
        (area.x + half, area.right() - half)
    }

    /// Place the player at `x`, keeping the box inside the area
    pub fn set_x(&mut self, x: f32, area: &PlayArea) {
        let (lo, hi) = self.x_range(area);
        self.pos.x = clamp_span(x, lo, hi);
    }

    /// Move toward a target x at a bounded speed
    pub fn move_toward(&mut self, target_x: f32, dt_secs: f32, max_speed: f32, area: &PlayArea) {
        let max_delta = max_speed * dt_secs;
        let delta = (target_x - self.pos.x).clamp(-max_delta, max_delta);
        self.set_x(self.pos.x + delta, area);
    }
}

/// A falling object (drawn as an apple)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: u32,
    /// Centre position
    pub pos: Vec2,
    /// Diameter; the collision box is `size` x `size`
    pub size: f32,
    /// Fall speed in units per second
    pub speed: f32,
}

impl FallingObject {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, Vec2::splat(self.size))
    }

    /// Advance by `dt_ms` milliseconds
    #[inline]
    pub fn fall(&mut self, dt_ms: f32) {
        self.pos.y += self.speed * (dt_ms / 1000.0);
    }

    /// True once the object's top edge is past the area bottom plus margin
    #[inline]
    pub fn has_exited(&self, area: &PlayArea, margin: f32) -> bool {
        self.pos.y - self.size / 2.0 > area.bottom() + margin
    }
}

/// State of one running session (deterministic given seed and inputs)
#[derive(Debug, Clone)]
pub struct SessionState {
    /// Seed the spawner was created from
    pub seed: u64,
    /// Balance values the session was started with
    pub tuning: Tuning,
    /// Caught-object score
    pub score: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Play field (fixed for the session)
    pub area: PlayArea,
    pub player: Player,
    /// Live objects (sorted by id)
    pub objects: Vec<FallingObject>,
    pub spawner: Spawner,
    /// Next entity ID
    next_id: u32,
}

impl SessionState {
    pub fn new(seed: u64, area: PlayArea, tuning: Tuning) -> Self {
        let player = Player::new(&area, &tuning);
        let spawner = Spawner::new(seed, &tuning);
        Self {
            seed,
            tuning,
            score: 0,
            time_ticks: 0,
            area,
            player,
            objects: Vec::new(),
            spawner,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Insert an object directly (tests and replays)
    pub fn push_object(&mut self, pos: Vec2, size: f32, speed: f32) -> u32 {
        let id = self.next_entity_id();
        self.objects.push(FallingObject {
            id,
            pos,
            size,
            speed,
        });
        id
    }

    /// Ensure objects are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.objects.sort_by_key(|o| o.id);
    }
}
