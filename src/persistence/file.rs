//! JSON file store (native)
//!
//! The whole key space is one JSON object. Every write serializes the full
//! map to `<path>.tmp` and renames it over the target, so a crash leaves
//! either the old or the new document, never a torn one.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{StateStore, StoreError};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open (or lazily create) a store at `path`.
    ///
    /// A corrupt document is set aside as `<path>.bad` and the store starts
    /// empty, matching the "no prior record" fallback.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let json = fs::read_to_string(&path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&json) {
                Ok(entries) => {
                    log::info!("Loaded {} entries from {}", entries.len(), path.display());
                    entries
                }
                Err(e) => {
                    log::warn!("Corrupt store {}: {}; starting fresh", path.display(), e);
                    fs::rename(&path, path.with_extension("bad"))?;
                    BTreeMap::new()
                }
            }
        } else {
            log::info!("No store at {}, starting fresh", path.display());
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl StateStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.set_many(&[(key, value.to_string())])
    }

    /// Both-or-neither: the in-memory map only changes after the file is replaced
    fn set_many(&mut self, entries: &[(&str, String)]) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        for (key, value) in entries {
            next.insert(key.to_string(), value.clone());
        }
        self.flush(&next)?;
        self.entries = next;
        Ok(())
    }
}
