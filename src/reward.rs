//! Reward settlement
//!
//! Converts a finished session's score into stars and records the new total
//! together with the timestamp that re-arms the cooldown.

use crate::persistence::{StateStore, StoreError, keys, read_u64};

/// Stars earned for a score: half the score, never less than one
#[inline]
pub fn reward_for_score(score: u32) -> u64 {
    (u64::from(score) / 2).max(1)
}

/// Outcome of settling a session
#[derive(Debug)]
pub struct Settlement {
    /// Final session score
    pub score: u32,
    /// Stars earned (reported even when persisting failed)
    pub reward: u64,
    /// Unsaved stars from earlier sessions written together with `reward`
    pub backlog: u64,
    /// Timestamp written as the last play time
    pub ended_at_ms: u64,
    /// Stored total after this reward, if the write went through
    pub new_total: Option<u64>,
    /// Why persisting failed, if it did
    pub error: Option<StoreError>,
}

impl Settlement {
    pub fn is_persisted(&self) -> bool {
        self.error.is_none()
    }
}

/// Compute the reward and persist it.
///
/// Never fails: a store error is carried in the returned settlement and the
/// reward is still reported.
pub fn settle<S: StateStore + ?Sized>(store: &mut S, score: u32, now_ms: u64) -> Settlement {
    settle_with_backlog(store, score, 0, now_ms)
}

/// Like [`settle`], but also writes `backlog` stars from earlier sessions
/// whose settlement could not be saved.
pub fn settle_with_backlog<S: StateStore + ?Sized>(
    store: &mut S,
    score: u32,
    backlog: u64,
    now_ms: u64,
) -> Settlement {
    let reward = reward_for_score(score);
    match persist_reward(store, reward.saturating_add(backlog), now_ms) {
        Ok(total) => {
            log::info!(
                "Settled score {} -> +{} stars, {} carried over (total {})",
                score,
                reward,
                backlog,
                total
            );
            Settlement {
                score,
                reward,
                backlog,
                ended_at_ms: now_ms,
                new_total: Some(total),
                error: None,
            }
        }
        Err(e) => {
            log::warn!("Reward +{} (+{} carried) not persisted: {}", reward, backlog, e);
            Settlement {
                score,
                reward,
                backlog,
                ended_at_ms: now_ms,
                new_total: None,
                error: Some(e),
            }
        }
    }
}

/// Add `reward` to the stored total and stamp the last play time.
///
/// The total is written before the timestamp. A current total that is
/// missing, malformed or unreadable counts as 0.
pub fn persist_reward<S: StateStore + ?Sized>(
    store: &mut S,
    reward: u64,
    now_ms: u64,
) -> Result<u64, StoreError> {
    let current = match read_u64(store, keys::STARS) {
        Ok(value) => value.unwrap_or(0),
        Err(e) => {
            log::warn!("Star total unreadable, counting from 0: {}", e);
            0
        }
    };
    let total = current.saturating_add(reward);
    store.set_many(&[
        (keys::STARS, total.to_string()),
        (keys::LAST_PLAY_TS, now_ms.to_string()),
    ])?;
    Ok(total)
}
