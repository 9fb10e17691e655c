//! Player profile: skin selection and the about-screen summary
//!
//! Both are read-only views over keys other screens write. Anything missing
//! or malformed falls back to a default instead of failing.

use serde::{Deserialize, Serialize};

use crate::persistence::{StateStore, StoreError, keys, read_u64};

/// Pet image drawn for the player box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Skin {
    #[default]
    Charles,
    Kenny,
    Wonder,
}

impl Skin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Skin::Charles => "charles",
            Skin::Kenny => "kenny",
            Skin::Wonder => "wonder",
        }
    }

    pub fn from_key(s: &str) -> Option<Self> {
        match s {
            "charles" => Some(Skin::Charles),
            "kenny" => Some(Skin::Kenny),
            "wonder" => Some(Skin::Wonder),
            _ => None,
        }
    }

    /// Skin from a raw profile document; unknown or broken data gives the default
    pub fn from_profile_json(raw: Option<&str>) -> Self {
        raw.and_then(|json| serde_json::from_str::<Profile>(json).ok())
            .and_then(|p| p.pet)
            .and_then(|pet| Skin::from_key(&pet))
            .unwrap_or_default()
    }

    /// Skin from the store
    pub fn load<S: StateStore + ?Sized>(store: &S) -> Self {
        match store.get(keys::PROFILE) {
            Ok(raw) => Self::from_profile_json(raw.as_deref()),
            Err(e) => {
                log::warn!("Profile unreadable, using default skin: {}", e);
                Self::default()
            }
        }
    }
}

/// The parts of the profile record this crate reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub pet: Option<String>,
}

/// Shown when no pet has been chosen
pub const NO_PET: &str = "—";

/// Progress summary shown on the about screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    pub stars: u64,
    pub quests_count: usize,
    /// Pet name, capitalised
    pub pet: String,
    pub level: u64,
}

impl Default for AppSummary {
    fn default() -> Self {
        Self {
            stars: 0,
            quests_count: 0,
            pet: NO_PET.to_string(),
            level: 1,
        }
    }
}

impl AppSummary {
    /// Gather the summary; any store failure yields the defaults
    pub fn load<S: StateStore + ?Sized>(store: &S) -> Self {
        match Self::try_load(store) {
            Ok(summary) => summary,
            Err(e) => {
                log::warn!("About summary unavailable: {}", e);
                Self::default()
            }
        }
    }

    fn try_load<S: StateStore + ?Sized>(store: &S) -> Result<Self, StoreError> {
        let stars = read_u64(store, keys::STARS)?.unwrap_or(0);
        let level = read_u64(store, keys::PET_LEVEL)?.filter(|&l| l > 0).unwrap_or(1);

        let quests_count = store
            .get(keys::QUESTS)?
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .and_then(|v| v.as_array().map(|a| a.len()))
            .unwrap_or(0);

        let pet = store
            .get(keys::PROFILE)?
            .and_then(|raw| serde_json::from_str::<Profile>(&raw).ok())
            .and_then(|p| p.pet)
            .filter(|name| !name.is_empty())
            .map(|name| capitalize(&name))
            .unwrap_or_else(|| NO_PET.to_string());

        Ok(Self {
            stars,
            quests_count,
            pet,
            level,
        })
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
