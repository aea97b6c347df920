//! Durable storage for geocode cache entries.
//!
//! The JSON file store survives restarts; the memory store backs tests and
//! dry runs. Both hold negative results (`position: null`) alongside hits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};
use trade_map_core::{Coordinates, Result};

/// A cached lookup result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// `None` records that the geocoder had no match.
    pub position: Option<Coordinates>,
    pub resolved_at: DateTime<Utc>,
}

impl CacheEntry {
    #[must_use]
    pub fn new(position: Option<Coordinates>) -> Self {
        Self {
            position,
            resolved_at: Utc::now(),
        }
    }
}

pub type CacheEntries = BTreeMap<String, CacheEntry>;

/// On-disk document format.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    entries: CacheEntries,
}

/// Key/value storage for the geocode cache.
pub trait CacheStore: Send {
    /// Reads every stored entry.
    ///
    /// # Errors
    /// Returns an error if the store exists but cannot be read.
    fn load(&self) -> Result<CacheEntries>;

    /// Replaces the stored entries.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn save(&mut self, entries: &CacheEntries) -> Result<()>;
}

/// Stores the cache as a pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<CacheDocument> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl CacheStore for JsonFileStore {
    /// A missing file is an empty cache. A corrupt file is logged and treated
    /// as empty; it is replaced on the next save.
    fn load(&self) -> Result<CacheEntries> {
        if !self.path.exists() {
            info!(
                path = %self.path.display(),
                "No geocode cache file found, starting empty"
            );
            return Ok(CacheEntries::new());
        }

        match self.read_document() {
            Ok(document) => {
                info!(
                    path = %self.path.display(),
                    entries = document.entries.len(),
                    "Loaded geocode cache"
                );
                Ok(document.entries)
            }
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to read geocode cache, starting empty"
                );
                Ok(CacheEntries::new())
            }
        }
    }

    fn save(&mut self, entries: &CacheEntries) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Write a sibling file first so a crash never leaves half a document.
        let tmp = self.path.with_extension("json.tmp");
        {
            let file = File::create(&tmp)?;
            let writer = BufWriter::new(file);
            serde_json::to_writer_pretty(
                writer,
                &CacheDocument {
                    entries: entries.clone(),
                },
            )?;
        }
        fs::rename(&tmp, &self.path)?;

        debug!(
            path = %self.path.display(),
            entries = entries.len(),
            "Saved geocode cache"
        );
        Ok(())
    }
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle and inspect what the cache wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<CacheEntries>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with entries.
    #[must_use]
    pub fn with_entries(entries: CacheEntries) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
        }
    }

    /// Copy of the current contents.
    #[must_use]
    pub fn snapshot(&self) -> CacheEntries {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl CacheStore for MemoryStore {
    fn load(&self) -> Result<CacheEntries> {
        Ok(self.snapshot())
    }

    fn save(&mut self, entries: &CacheEntries) -> Result<()> {
        if let Ok(mut stored) = self.entries.lock() {
            stored.clone_from(entries);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn temp_path() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cache").join("geocode.json");
        (dir, path)
    }

    fn entries() -> CacheEntries {
        let mut entries = CacheEntries::new();
        entries.insert(
            "USA".to_string(),
            CacheEntry::new(Some(Coordinates::new(39.8, -98.6))),
        );
        entries.insert("ATL".to_string(), CacheEntry::new(None));
        entries
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let (_dir, path) = temp_path();
        let store = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip_keeps_negative_results() {
        let (_dir, path) = temp_path();
        let mut store = JsonFileStore::new(path.clone());
        store.save(&entries()).unwrap();

        assert!(path.exists());
        let loaded = JsonFileStore::new(path).load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded["ATL"].position, None);
        assert_eq!(loaded["USA"].position, Some(Coordinates::new(39.8, -98.6)));
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let (_dir, path) = temp_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(&path).unwrap();
        file.write_all(b"{ not json").unwrap();

        let store = JsonFileStore::new(path);
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_saved_document_shape() {
        let (_dir, path) = temp_path();
        JsonFileStore::new(path.clone()).save(&entries()).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["entries"]["ATL"]["position"].is_null());
        assert_eq!(raw["entries"]["USA"]["position"]["lat"], 39.8);
        assert!(raw["entries"]["USA"]["resolved_at"].is_string());
    }

    #[test]
    fn test_memory_store_clones_share_state() {
        let store = MemoryStore::new();
        let mut writer = store.clone();
        writer.save(&entries()).unwrap();
        assert_eq!(store.snapshot().len(), 2);
        assert_eq!(store.load().unwrap().len(), 2);
    }
}
