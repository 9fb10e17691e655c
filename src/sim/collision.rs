//! Collision detection between the player box and falling objects
//!
//! Both shapes are treated as axis-aligned boxes. Objects are drawn as
//! circles but caught by their square bounds.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{FallingObject, Player};

/// Axis-aligned bounding box (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Aabb {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Box of the given full size centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self::new(
            center.x - half.x,
            center.y - half.y,
            center.x + half.x,
            center.y + half.y,
        )
    }

    /// Strict overlap test: boxes that only share an edge do not overlap.
    ///
    /// An object resting exactly on the player's edge is a miss. A `<`-based
    /// disjoint test would instead count that contact as a catch.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(other.right <= self.left
            || other.left >= self.right
            || other.bottom <= self.top
            || other.top >= self.bottom)
    }
}

/// Check whether the player catches an object this tick
#[inline]
pub fn player_catches(player: &Player, object: &FallingObject) -> bool {
    player.bounds().overlaps(&object.bounds())
}
