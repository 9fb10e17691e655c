//! Mini-game session controller
//!
//! Owns the session lifecycle (Idle -> Running -> Ended -> Idle) on top of
//! the pure pieces: the cooldown gate, the session clock, the simulation
//! tick and reward settlement. The store is injected and only touched when
//! polling the gate, starting, and settling; never inside a frame's physics.
//!
//! Callers drive it from their frame callback with wall-clock `now_ms`
//! values and read [`Frame`]s back for rendering.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cooldown::{CooldownStatus, can_start};
use crate::persistence::{StateStore, keys, read_u64};
use crate::profile::Skin;
use crate::reward::{Settlement, reward_for_score, settle_with_backlog};
use crate::sim::{
    Aabb, GameEvent, PlayArea, SessionClock, SessionPhase, SessionState, TickInput, tick,
};
use crate::tuning::Tuning;

/// Why a session could not start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// The cooldown gate is still closed
    CoolingDown { remaining_ms: u64 },
    /// A session is already in progress
    AlreadyRunning,
}

impl fmt::Display for StartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartError::CoolingDown { remaining_ms } => {
                write!(f, "next session available in {} ms", remaining_ms)
            }
            StartError::AlreadyRunning => write!(f, "a session is already running"),
        }
    }
}

impl std::error::Error for StartError {}

/// What one frame produced
#[derive(Debug)]
pub struct TickReport {
    pub score: u32,
    pub remaining_secs: u64,
    pub events: Vec<GameEvent>,
    /// Present on the frame the session ended
    pub settlement: Option<Settlement>,
}

/// Falling object as seen by a renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub size: f32,
}

/// Read-only snapshot for a presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub phase: SessionPhase,
    pub score: u32,
    pub remaining_secs: u64,
    pub cooldown: CooldownStatus,
    pub skin: Skin,
    /// Stars from the most recent settlement, until the next start
    pub last_reward: Option<u64>,
    pub player: Option<Aabb>,
    pub objects: Vec<ObjectView>,
}

/// Settlement whose persistence failed and may be retried
#[derive(Debug, Clone, Copy)]
struct PendingSettlement {
    score: u32,
    ended_at_ms: u64,
    /// Stars from even earlier unsaved sessions
    backlog: u64,
}

impl PendingSettlement {
    /// Every star this settlement still owes the store
    fn owed(&self) -> u64 {
        reward_for_score(self.score).saturating_add(self.backlog)
    }
}

/// The catch mini-game bound to a state store
pub struct MiniGame<S: StateStore> {
    store: S,
    tuning: Tuning,
    area: PlayArea,
    skin: Skin,
    clock: SessionClock,
    session: Option<SessionState>,
    last_frame_ms: u64,
    cooldown: CooldownStatus,
    last_score: u32,
    last_reward: Option<u64>,
    pending: Option<PendingSettlement>,
}

impl<S: StateStore> MiniGame<S> {
    pub fn new(store: S, tuning: Tuning, area: PlayArea) -> Self {
        let skin = Skin::load(&store);
        log::info!("Mini-game ready (skin: {})", skin.as_str());
        Self {
            clock: SessionClock::new(tuning.session_ms),
            store,
            tuning,
            area,
            skin,
            session: None,
            last_frame_ms: 0,
            cooldown: CooldownStatus::READY,
            last_score: 0,
            last_reward: None,
            pending: None,
        }
    }

    /// Re-read the last play time and re-evaluate the gate.
    ///
    /// An unreadable store counts as "never played".
    pub fn poll_cooldown(&mut self, now_ms: u64) -> CooldownStatus {
        self.cooldown = match read_u64(&self.store, keys::LAST_PLAY_TS) {
            Ok(Some(last)) => can_start(now_ms, last, self.tuning.cooldown_ms),
            Ok(None) => CooldownStatus::READY,
            Err(e) => {
                log::warn!("Cooldown record unreadable, allowing play: {}", e);
                CooldownStatus::READY
            }
        };
        self.cooldown
    }

    /// Start a session if the gate allows it
    pub fn start(&mut self, now_ms: u64, seed: u64) -> Result<(), StartError> {
        if self.clock.phase != SessionPhase::Idle {
            return Err(StartError::AlreadyRunning);
        }
        let status = self.poll_cooldown(now_ms);
        if !status.allowed {
            return Err(StartError::CoolingDown {
                remaining_ms: status.remaining_ms,
            });
        }

        self.clock.start(now_ms);
        self.session = Some(SessionState::new(seed, self.area, self.tuning.clone()));
        self.last_frame_ms = now_ms;
        self.last_score = 0;
        self.last_reward = None;
        log::info!("Session started (seed {})", seed);
        Ok(())
    }

    /// Advance a running session to `now_ms`. Returns `None` when idle.
    ///
    /// Physics never runs past the session's end; the frame that reaches it
    /// settles the reward and returns the controller to idle.
    pub fn tick(&mut self, now_ms: u64, input: &TickInput) -> Option<TickReport> {
        if self.clock.phase != SessionPhase::Running {
            return None;
        }
        let session = self.session.as_mut()?;

        let end_ms = self
            .clock
            .started_at_ms
            .unwrap_or(now_ms)
            .saturating_add(self.clock.duration_ms);
        let sim_to = now_ms.min(end_ms);
        let dt_ms = sim_to.saturating_sub(self.last_frame_ms) as f32;
        self.last_frame_ms = self.last_frame_ms.max(sim_to);

        let events = tick(session, input, dt_ms);
        self.last_score = session.score;

        if self.clock.update(now_ms) {
            let settlement = self.finish(now_ms);
            return Some(TickReport {
                score: self.last_score,
                remaining_secs: 0,
                events,
                settlement: Some(settlement),
            });
        }

        Some(TickReport {
            score: self.last_score,
            remaining_secs: self.clock.remaining_secs(now_ms),
            events,
            settlement: None,
        })
    }

    /// Drop a running session without a reward (screen teardown)
    pub fn abandon(&mut self) {
        if self.clock.stop() {
            log::info!("Session abandoned with score {}", self.last_score);
        }
        self.session = None;
        self.clock.reset();
    }

    /// Retry a settlement whose write failed. `None` if nothing is pending.
    ///
    /// Rewards from every unsaved session are written in one go, stamped
    /// with the latest end time.
    pub fn retry_settlement(&mut self) -> Option<Settlement> {
        let pending = self.pending?;
        let settlement = settle_with_backlog(
            &mut self.store,
            pending.score,
            pending.backlog,
            pending.ended_at_ms,
        );
        if settlement.is_persisted() {
            self.pending = None;
        }
        Some(settlement)
    }

    fn finish(&mut self, now_ms: u64) -> Settlement {
        // Entities go away with the session state
        self.session = None;

        // Unsaved rewards from earlier sessions ride along with this one
        let backlog = self.pending.map_or(0, |p| p.owed());
        let settlement = settle_with_backlog(&mut self.store, self.last_score, backlog, now_ms);
        self.last_reward = Some(settlement.reward);
        self.pending = if settlement.is_persisted() {
            None
        } else {
            Some(PendingSettlement {
                score: self.last_score,
                ended_at_ms: now_ms,
                backlog,
            })
        };

        self.clock.reset();
        self.poll_cooldown(now_ms);
        log::info!(
            "Session ended: score {}, reward {}",
            self.last_score,
            settlement.reward
        );
        settlement
    }

    /// Snapshot for rendering
    pub fn frame(&self, now_ms: u64) -> Frame {
        let (player, objects) = match &self.session {
            Some(s) => (
                Some(s.player.bounds()),
                s.objects
                    .iter()
                    .map(|o| ObjectView {
                        id: o.id,
                        x: o.pos.x,
                        y: o.pos.y,
                        size: o.size,
                    })
                    .collect(),
            ),
            None => (None, Vec::new()),
        };
        Frame {
            phase: self.clock.phase,
            score: self.last_score,
            remaining_secs: self.clock.remaining_secs(now_ms),
            cooldown: self.cooldown,
            skin: self.skin,
            last_reward: self.last_reward,
            player,
            objects,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.clock.phase
    }

    /// Score of the running session, or of the last one
    pub fn score(&self) -> u32 {
        self.last_score
    }

    pub fn last_reward(&self) -> Option<u64> {
        self.last_reward
    }

    /// Gate status as of the last poll
    pub fn cooldown(&self) -> CooldownStatus {
        self.cooldown
    }

    pub fn has_pending_settlement(&self) -> bool {
        self.pending.is_some()
    }

    pub fn skin(&self) -> Skin {
        self.skin
    }

    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    /// Direct access to the running session (tests, replays)
    pub fn session_mut(&mut self) -> Option<&mut SessionState> {
        self.session.as_mut()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::persistence::MemoryStore;

    const T0: u64 = 1_700_000_000_000;

    fn game(store: MemoryStore) -> MiniGame<MemoryStore> {
        MiniGame::new(
            store,
            Tuning::default(),
            PlayArea::new(16.0, 0.0, 368.0, 380.0),
        )
    }

    #[test]
    fn test_fresh_store_allows_start() {
        let mut game = game(MemoryStore::new());
        assert!(game.poll_cooldown(T0).allowed);
        assert!(game.start(T0, 1).is_ok());
        assert_eq!(game.phase(), SessionPhase::Running);
        assert_eq!(game.start(T0 + 10, 1), Err(StartError::AlreadyRunning));
    }

    #[test]
    fn test_cooldown_blocks_start() {
        let last = T0.to_string();
        let mut game = game(MemoryStore::with_entries([(keys::LAST_PLAY_TS, last.as_str())]));
        let result = game.start(T0 + 60_000, 1);
        assert_eq!(
            result,
            Err(StartError::CoolingDown {
                remaining_ms: 540_000
            })
        );
        assert_eq!(game.phase(), SessionPhase::Idle);
    }

    #[test]
    fn test_unreadable_store_allows_start() {
        let mut store = MemoryStore::with_entries([(keys::LAST_PLAY_TS, "1")]);
        store.fail_reads = true;
        let mut game = game(store);
        assert!(game.start(T0, 1).is_ok());
    }

    #[test]
    fn test_session_runs_for_twenty_seconds_and_settles_once() {
        let mut game = game(MemoryStore::new());
        game.start(T0, 5).unwrap();
        let input = TickInput::default();

        let mut settlements = 0;
        let mut now = T0;
        while now <= T0 + 25_000 {
            now += 16;
            if let Some(report) = game.tick(now, &input) {
                if report.settlement.is_some() {
                    settlements += 1;
                    assert!(now >= T0 + 20_000);
                    assert_eq!(report.remaining_secs, 0);
                }
            }
        }

        assert_eq!(settlements, 1);
        assert_eq!(game.phase(), SessionPhase::Idle);
        assert!(game.session().is_none());
        assert!(!game.cooldown().allowed);
    }

    #[test]
    fn test_catch_through_controller() {
        let mut game = game(MemoryStore::new());
        game.start(T0, 5).unwrap();

        let session = game.session_mut().unwrap();
        let center = session.player.pos;
        let id = session.push_object(center, 40.0, 0.0);

        let report = game.tick(T0 + 16, &TickInput::default()).unwrap();
        assert!(report.events.contains(&GameEvent::Caught { id, value: 1 }));
        assert_eq!(report.score, 1);
        assert_eq!(report.remaining_secs, 20);
    }

    #[test]
    fn test_write_failure_is_retryable() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let mut game = game(store);
        game.start(T0, 1).unwrap();

        let report = game.tick(T0 + 20_000, &TickInput::default()).unwrap();
        let settlement = report.settlement.unwrap();
        assert_eq!(settlement.reward, 1);
        assert!(!settlement.is_persisted());
        assert!(game.has_pending_settlement());
        // Nothing persisted, so the gate stays open
        assert!(game.cooldown().allowed);

        game.store_mut().fail_writes = false;
        let retried = game.retry_settlement().unwrap();
        assert!(retried.is_persisted());
        assert_eq!(retried.new_total, Some(1));
        assert!(!game.has_pending_settlement());
        assert!(game.retry_settlement().is_none());
        assert!(!game.poll_cooldown(T0 + 20_000).allowed);
    }

    #[test]
    fn test_unsaved_reward_carried_into_next_session() {
        let mut store = MemoryStore::with_entries([(keys::STARS, "10")]);
        store.fail_writes = true;
        let mut game = game(store);

        game.start(T0, 1).unwrap();
        let first = game.tick(T0 + 20_000, &TickInput::default()).unwrap();
        let first = first.settlement.unwrap();
        assert!(!first.is_persisted());
        assert!(game.has_pending_settlement());

        // Gate stays open since nothing was stamped; play again with writes back
        game.store_mut().fail_writes = false;
        game.start(T0 + 30_000, 2).unwrap();
        let second = game.tick(T0 + 50_000, &TickInput::default()).unwrap();
        let second = second.settlement.unwrap();

        assert!(second.is_persisted());
        assert_eq!(second.backlog, first.reward);
        assert!(!game.has_pending_settlement());
        assert!(game.retry_settlement().is_none());
        let expected = 10 + first.reward + second.reward;
        assert_eq!(second.new_total, Some(expected));
        assert_eq!(game.store().get(keys::STARS).unwrap(), Some(expected.to_string()));
        assert_eq!(
            game.store().get(keys::LAST_PLAY_TS).unwrap(),
            Some((T0 + 50_000).to_string())
        );
    }

    #[test]
    fn test_repeated_write_failures_accumulate_backlog() {
        let mut store = MemoryStore::new();
        store.fail_writes = true;
        let mut game = game(store);

        game.start(T0, 1).unwrap();
        game.tick(T0 + 20_000, &TickInput::default()).unwrap();
        game.start(T0 + 30_000, 2).unwrap();
        let second = game.tick(T0 + 50_000, &TickInput::default()).unwrap();
        assert_eq!(second.settlement.unwrap().backlog, 1);

        game.store_mut().fail_writes = false;
        let retried = game.retry_settlement().unwrap();
        assert_eq!(retried.new_total, Some(2));
        assert_eq!(game.store().get(keys::LAST_PLAY_TS).unwrap(), Some((T0 + 50_000).to_string()));
    }

    #[test]
    fn test_abandon_drops_session_without_reward() {
        let mut game = game(MemoryStore::new());
        game.start(T0, 1).unwrap();
        game.tick(T0 + 1_000, &TickInput::default());
        game.abandon();

        assert_eq!(game.phase(), SessionPhase::Idle);
        assert!(game.session().is_none());
        assert!(game.tick(T0 + 2_000, &TickInput::default()).is_none());
        assert_eq!(game.store().get(keys::STARS).unwrap(), None);
        assert!(game.start(T0 + 3_000, 2).is_ok());
    }

    #[test]
    fn test_physics_stops_at_session_end() {
        let mut game = game(MemoryStore::new());
        game.start(T0, 1).unwrap();
        {
            let session = game.session_mut().unwrap();
            session.player.set_x(1_000.0, &PlayArea::new(16.0, 0.0, 368.0, 380.0));
        }
        game.tick(T0 + 19_000, &TickInput::default()).unwrap();

        // A late frame far past the end only simulates the last second
        let report = game.tick(T0 + 60_000, &TickInput::default()).unwrap();
        assert!(report.settlement.is_some());
        assert_eq!(game.store().get(keys::LAST_PLAY_TS).unwrap(), Some((T0 + 60_000).to_string()));
    }

    #[test]
    fn test_frame_snapshot() {
        let mut game = game(MemoryStore::with_entries([(keys::PROFILE, r#"{"pet":"kenny"}"#)]));
        let idle = game.frame(T0);
        assert_eq!(idle.phase, SessionPhase::Idle);
        assert_eq!(idle.skin, Skin::Kenny);
        assert!(idle.player.is_none());

        game.start(T0, 3).unwrap();
        game.session_mut()
            .unwrap()
            .push_object(Vec2::new(30.0, 0.0), 30.0, 0.0);
        let frame = game.frame(T0 + 500);
        assert_eq!(frame.phase, SessionPhase::Running);
        assert_eq!(frame.remaining_secs, 20);
        assert!(frame.player.is_some());
        assert_eq!(frame.objects.len(), 1);
        assert!(serde_json::to_string(&frame).is_ok());
    }
}
