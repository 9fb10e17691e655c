//! Data-driven game balance
//!
//! Every gameplay number lives here so a session can be rebalanced from a
//! JSON file without a rebuild. Missing fields fall back to `consts`.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tuning load/validation failure
#[derive(Debug)]
pub enum TuningError {
    Io(std::io::Error),
    Json(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Io(e) => write!(f, "failed to read tuning file: {}", e),
            TuningError::Json(e) => write!(f, "malformed tuning file: {}", e),
            TuningError::Invalid(msg) => write!(f, "invalid tuning: {}", msg),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Io(e) => Some(e),
            TuningError::Json(e) => Some(e),
            TuningError::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for TuningError {
    fn from(e: std::io::Error) -> Self {
        TuningError::Io(e)
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Json(e)
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Session ===
    pub cooldown_ms: u64,
    pub session_ms: u64,

    // === Spawning ===
    pub spawn_interval_ms: f32,
    pub spawn_warmup_ms: f32,
    pub object_min_size: f32,
    pub object_max_size: f32,
    pub object_min_speed: f32,
    pub object_max_speed: f32,
    pub exit_margin: f32,

    // === Area & player ===
    pub area_height: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub edge_pad: f32,
    pub autopilot_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            cooldown_ms: COOLDOWN_MS,
            session_ms: SESSION_MS,

            spawn_interval_ms: SPAWN_INTERVAL_MS,
            spawn_warmup_ms: SPAWN_WARMUP_MS,
            object_min_size: OBJECT_MIN_SIZE,
            object_max_size: OBJECT_MAX_SIZE,
            object_min_speed: OBJECT_MIN_SPEED,
            object_max_speed: OBJECT_MAX_SPEED,
            exit_margin: EXIT_MARGIN,

            area_height: AREA_HEIGHT,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            edge_pad: EDGE_PAD,
            autopilot_speed: AUTOPILOT_SPEED,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.session_ms == 0 {
            return Err(TuningError::Invalid("session_ms must be positive".into()));
        }
        if self.spawn_interval_ms <= 0.0 {
            return Err(TuningError::Invalid(
                "spawn_interval_ms must be positive".into(),
            ));
        }
        if self.spawn_warmup_ms < 0.0 {
            return Err(TuningError::Invalid(
                "spawn_warmup_ms must not be negative".into(),
            ));
        }
        if self.object_min_size <= 0.0 || self.object_min_size > self.object_max_size {
            return Err(TuningError::Invalid(format!(
                "object size range {}..{} is empty",
                self.object_min_size, self.object_max_size
            )));
        }
        if self.object_min_speed < 0.0 || self.object_min_speed > self.object_max_speed {
            return Err(TuningError::Invalid(format!(
                "object speed range {}..{} is empty",
                self.object_min_speed, self.object_max_speed
            )));
        }
        if self.player_width <= 0.0 || self.player_height <= 0.0 {
            return Err(TuningError::Invalid("player box must be non-empty".into()));
        }
        if self.area_height <= 0.0 {
            return Err(TuningError::Invalid("area_height must be positive".into()));
        }
        Ok(())
    }

    /// Play area width for a screen (inset on both sides, never narrower than the minimum)
    pub fn area_width_for_screen(&self, screen_width: f32) -> f32 {
        (screen_width - 2.0 * AREA_SIDE_INSET).round().max(AREA_MIN_WIDTH)
    }
}
