//! Persisted key-value state
//!
//! The mini-game never touches a global store. Callers inject a
//! [`StateStore`]; this module provides:
//! - `MemoryStore`: in-process map with failure injection (tests)
//! - `JsonFileStore`: one JSON document on disk, tmp-then-rename writes (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm)
//!
//! Values are strings, matching what the rest of the app writes under the
//! same keys. The reward total is shared with other screens and is
//! last-write-wins.

use std::fmt;

pub mod memory;
#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local_storage;

pub use memory::MemoryStore;
#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStore;
#[cfg(target_arch = "wasm32")]
pub use local_storage::LocalStorageStore;

/// Storage keys shared with the rest of the app
pub mod keys {
    /// Cumulative stars across all mini-games
    pub const STARS: &str = "bsp:stars";
    /// End time of the last catch session (ms since epoch)
    pub const LAST_PLAY_TS: &str = "bsp:luckySpin:lastTs";
    /// Player profile JSON (selected pet)
    pub const PROFILE: &str = "@bsp_profile";
    /// Quest list JSON
    pub const QUESTS: &str = "bsp:quests";
    /// Pet level
    pub const PET_LEVEL: &str = "@pet:level";
}

/// Storage failure
#[derive(Debug)]
pub enum StoreError {
    /// Backend not reachable at all (no window, no LocalStorage, ...)
    Unavailable(String),
    Read { key: String, reason: String },
    Write { key: String, reason: String },
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(why) => write!(f, "store unavailable: {}", why),
            StoreError::Read { key, reason } => write!(f, "failed to read '{}': {}", key, reason),
            StoreError::Write { key, reason } => {
                write!(f, "failed to write '{}': {}", key, reason)
            }
            StoreError::Io(e) => write!(f, "store I/O error: {}", e),
            StoreError::Json(e) => write!(f, "store JSON error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Json(e)
    }
}

/// Injected key-value store
pub trait StateStore {
    /// Read a key; `Ok(None)` when it was never written
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a single key
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write several keys as one unit.
    ///
    /// The default writes in order and stops at the first failure, so later
    /// entries are only written once earlier ones succeeded. Backends that
    /// can commit atomically override this.
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

/// Read an integer stored as a decimal string.
///
/// Missing or malformed values read as `None`; only backend failures are
/// errors.
pub fn read_u64<S: StateStore + ?Sized>(store: &S, key: &str) -> Result<Option<u64>, StoreError> {
    let raw = store.get(key)?;
    Ok(raw.and_then(|s| parse_leading_u64(&s)))
}

/// Parse the leading decimal digits (so "12abc" reads as 12, "abc" as nothing).
/// Values too large for a `u64` saturate.
fn parse_leading_u64(s: &str) -> Option<u64> {
    let trimmed = s.trim_start();
    let digits_end = trimmed
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(trimmed.len());
    let digits = &trimmed[..digits_end];
    if digits.is_empty() {
        return None;
    }
    // Only overflow can fail on a non-empty run of digits
    Some(digits.parse().unwrap_or(u64::MAX))
}
