//! Spawn scheduler for falling objects
//!
//! Fires once after a short warm-up and then at a fixed interval. All
//! randomness comes from a seeded PCG stream so a session replays exactly.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{FallingObject, PlayArea};
use crate::tuning::Tuning;

/// Timer and RNG that decide when and what to spawn
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    /// Milliseconds since the last spawn (or since the session began)
    pub since_last_ms: f32,
    /// Wait before the next spawn (warm-up first, then the interval)
    pub next_in_ms: f32,
    interval_ms: f32,
    min_size: f32,
    max_size: f32,
    min_speed: f32,
    max_speed: f32,
}

impl Spawner {
    pub fn new(seed: u64, tuning: &Tuning) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            since_last_ms: 0.0,
            next_in_ms: tuning.spawn_warmup_ms,
            interval_ms: tuning.spawn_interval_ms,
            min_size: tuning.object_min_size,
            max_size: tuning.object_max_size,
            min_speed: tuning.object_min_speed,
            max_speed: tuning.object_max_speed,
        }
    }

    /// Advance the timer; returns true when a spawn is due (and re-arms)
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.since_last_ms += dt_ms;
        if self.since_last_ms >= self.next_in_ms {
            self.since_last_ms = 0.0;
            self.next_in_ms = self.interval_ms;
            true
        } else {
            false
        }
    }

    /// Roll a new object that fits horizontally and starts above the area
    pub fn roll(&mut self, id: u32, area: &PlayArea) -> FallingObject {
        let size = uniform(&mut self.rng, self.min_size, self.max_size).round();
        let x = area.x + uniform(&mut self.rng, size / 2.0, area.width - size / 2.0);
        let y = area.y - size;
        let speed = uniform(&mut self.rng, self.min_speed, self.max_speed);
        FallingObject {
            id,
            pos: Vec2::new(x, y),
            size,
            speed,
        }
    }
}

/// Uniform sample in `[lo, hi]`; degenerate ranges collapse to `lo`
fn uniform(rng: &mut Pcg32, lo: f32, hi: f32) -> f32 {
    if hi <= lo {
        return lo;
    }
    rng.random_range(lo..=hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_then_interval() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(7, &tuning);

        assert!(!spawner.advance(199.0));
        assert!(spawner.advance(1.0)); // 200 ms warm-up reached

        assert!(!spawner.advance(549.0));
        assert!(spawner.advance(1.0)); // 550 ms interval
        assert!(!spawner.advance(100.0));
    }

    #[test]
    fn test_rolled_object_fits_area() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(42, &tuning);
        let area = PlayArea::new(16.0, 0.0, 368.0, 380.0);

        for id in 0..500 {
            let obj = spawner.roll(id, &area);
            assert!(obj.size >= 28.0 && obj.size <= 56.0);
            assert_eq!(obj.size, obj.size.round());
            assert!(obj.pos.x - obj.size / 2.0 >= area.x - 1e-3);
            assert!(obj.pos.x + obj.size / 2.0 <= area.right() + 1e-3);
            assert_eq!(obj.pos.y, area.y - obj.size);
            assert!(obj.speed >= 160.0 && obj.speed <= 300.0);
        }
    }

    #[test]
    fn test_same_seed_same_objects() {
        let tuning = Tuning::default();
        let area = PlayArea::new(0.0, 0.0, 300.0, 380.0);
        let mut a = Spawner::new(99, &tuning);
        let mut b = Spawner::new(99, &tuning);
        for id in 0..10 {
            assert_eq!(a.roll(id, &area), b.roll(id, &area));
        }
    }

    #[test]
    fn test_narrow_area_does_not_panic() {
        let tuning = Tuning::default();
        let mut spawner = Spawner::new(1, &tuning);
        let area = PlayArea::new(0.0, 0.0, 10.0, 380.0);
        let obj = spawner.roll(1, &area);
        assert!(obj.pos.x.is_finite());
    }
}
