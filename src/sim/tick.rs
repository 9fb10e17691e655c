//! Simulation tick
//!
//! One frame of the running session: input, spawning, motion, collisions
//! and scoring, in that order.

use super::collision::player_catches;
use super::state::{GameEvent, SessionState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired player centre x (from touch/mouse), clamped to the area
    pub player_x: Option<f32>,
    /// Idle/demo mode - steer toward the lowest falling object
    pub autopilot: bool,
}

/// Advance the session by `dt_ms` milliseconds and return what happened
pub fn tick(state: &mut SessionState, input: &TickInput, dt_ms: f32) -> Vec<GameEvent> {
    let dt_ms = dt_ms.max(0.0);
    let mut events = Vec::new();

    state.time_ticks += 1;

    steer_player(state, input, dt_ms);

    // Spawn
    if state.spawner.advance(dt_ms) {
        let id = state.next_entity_id();
        let obj = state.spawner.roll(id, &state.area);
        log::debug!(
            "Spawned object {} at x={:.1} size={} speed={:.0}",
            id,
            obj.pos.x,
            obj.size,
            obj.speed
        );
        state.objects.push(obj);
        events.push(GameEvent::Spawned { id });
    }

    // Motion, then drop anything that fell out of view
    for obj in &mut state.objects {
        obj.fall(dt_ms);
    }
    let area = state.area;
    let margin = state.tuning.exit_margin;
    state.objects.retain(|obj| {
        if obj.has_exited(&area, margin) {
            events.push(GameEvent::Missed { id: obj.id });
            false
        } else {
            true
        }
    });

    // Collisions: a caught object is removed on the spot
    let player = state.player;
    state.objects.retain(|obj| {
        if player_catches(&player, obj) {
            events.push(GameEvent::Caught { id: obj.id, value: 1 });
            false
        } else {
            true
        }
    });

    accumulate_score(&mut state.score, &events);

    // Ensure deterministic ordering
    state.normalize_order();

    events
}

/// Add every caught event to the score
pub fn accumulate_score(score: &mut u32, events: &[GameEvent]) {
    for event in events {
        if let GameEvent::Caught { value, .. } = event {
            *score = score.saturating_add(*value);
        }
    }
}

fn steer_player(state: &mut SessionState, input: &TickInput, dt_ms: f32) {
    if let Some(x) = input.player_x {
        state.player.set_x(x, &state.area);
        return;
    }
    if !input.autopilot {
        return;
    }

    // Chase the lowest object that is still above the player's feet
    let feet = state.player.bounds().bottom;
    let target = state
        .objects
        .iter()
        .filter(|o| o.pos.y - o.size / 2.0 < feet)
        .max_by(|a, b| {
            a.pos
                .y
                .partial_cmp(&b.pos.y)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|o| o.pos.x);

    if let Some(target_x) = target {
        let speed = state.tuning.autopilot_speed;
        state
            .player
            .move_toward(target_x, dt_ms / 1000.0, speed, &state.area);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::sim::state::PlayArea;
    use crate::tuning::Tuning;

    fn session(seed: u64) -> SessionState {
        SessionState::new(seed, PlayArea::new(0.0, 0.0, 300.0, 380.0), Tuning::default())
    }

    /// Session whose spawner never fires during the test
    fn quiet_session() -> SessionState {
        let tuning = Tuning {
            spawn_warmup_ms: 1.0e9,
            ..Tuning::default()
        };
        SessionState::new(1, PlayArea::new(0.0, 0.0, 300.0, 380.0), tuning)
    }

    #[test]
    fn test_first_spawn_after_warmup() {
        let mut state = session(12345);
        let input = TickInput::default();

        let events = tick(&mut state, &input, 100.0);
        assert!(events.is_empty());
        assert!(state.objects.is_empty());

        let events = tick(&mut state, &input, 100.0);
        assert!(matches!(events[..], [GameEvent::Spawned { .. }]));
        assert_eq!(state.objects.len(), 1);
    }

    #[test]
    fn test_motion_two_seconds() {
        let mut state = quiet_session();
        // Keep the player far from the object's column
        state.player.set_x(300.0, &PlayArea::new(0.0, 0.0, 300.0, 380.0));
        let id = state.push_object(Vec2::new(100.0, -20.0), 40.0, 200.0);

        let events = tick(&mut state, &TickInput::default(), 2000.0);
        assert!(events.is_empty());

        let obj = state.objects.iter().find(|o| o.id == id).unwrap();
        assert!((obj.pos.y - 380.0).abs() < 1e-3);
    }

    #[test]
    fn test_object_removed_past_margin() {
        let mut state = quiet_session();
        state.player.set_x(300.0, &PlayArea::new(0.0, 0.0, 300.0, 380.0));
        let id = state.push_object(Vec2::new(20.0, 440.0), 40.0, 200.0);

        let events = tick(&mut state, &TickInput::default(), 10.0);
        assert_eq!(events, vec![GameEvent::Missed { id }]);
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_catch_scores_once() {
        let mut state = quiet_session();
        let center = state.player.pos;
        let id = state.push_object(center, 40.0, 200.0);

        let events = tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(events, vec![GameEvent::Caught { id, value: 1 }]);
        assert_eq!(state.score, 1);
        assert!(state.objects.is_empty());

        // Nothing left to catch
        let events = tick(&mut state, &TickInput::default(), 16.0);
        assert!(events.is_empty());
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_simultaneous_catches() {
        let mut state = quiet_session();
        let center = state.player.pos;
        state.push_object(center + Vec2::new(-20.0, 0.0), 30.0, 200.0);
        state.push_object(center + Vec2::new(20.0, 0.0), 30.0, 200.0);

        let events = tick(&mut state, &TickInput::default(), 16.0);
        assert_eq!(events.len(), 2);
        assert_eq!(state.score, 2);
    }

    #[test]
    fn test_player_input_is_clamped() {
        let mut state = quiet_session();
        let input = TickInput {
            player_x: Some(-1000.0),
            ..Default::default()
        };
        tick(&mut state, &input, 16.0);
        assert_eq!(state.player.pos.x, 48.0);
    }

    #[test]
    fn test_autopilot_moves_toward_object() {
        let mut state = quiet_session();
        let start_x = state.player.pos.x;
        state.push_object(Vec2::new(20.0, 0.0), 40.0, 0.0);

        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };
        tick(&mut state, &input, 100.0);
        assert!(state.player.pos.x < start_x);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = session(99999);
        let mut state2 = session(99999);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..600 {
            let e1 = tick(&mut state1, &input, 1000.0 / 60.0);
            let e2 = tick(&mut state2, &input, 1000.0 / 60.0);
            assert_eq!(e1, e2);
        }

        assert_eq!(state1.score, state2.score);
        assert_eq!(state1.objects, state2.objects);
    }

    #[test]
    fn test_negative_dt_is_ignored() {
        let mut state = quiet_session();
        let id = state.push_object(Vec2::new(20.0, 0.0), 40.0, 200.0);
        tick(&mut state, &TickInput::default(), -500.0);
        let obj = state.objects.iter().find(|o| o.id == id).unwrap();
        assert_eq!(obj.pos.y, 0.0);
    }
}
