//! Document storage collaborator
//!
//! The document list is kept as one JSON blob under a string key. The
//! desktop implementation stores each key as `{key}.json` in the platform
//! data directory; tests use an in-memory map.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::config::APP_NAME;
use crate::error::{Error, Result};

/// Key/value storage for serialized document lists.
pub trait DocumentStorage {
    /// Read the value stored under `key`; `Ok(None)` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`.
    fn save(&mut self, key: &str, value: &str) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON Files
// ─────────────────────────────────────────────────────────────────────────────

/// Storage backed by one JSON file per key in a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Store files in `dir` (created on first save).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store files in the platform data directory.
    ///
    /// - **Windows**: `%APPDATA%\novascribe\`
    /// - **macOS**: `~/Library/Application Support/novascribe/`
    /// - **Linux**: `~/.local/share/novascribe/`
    pub fn in_data_dir() -> Result<Self> {
        dirs::data_dir()
            .map(|base| Self::new(base.join(APP_NAME)))
            .ok_or(Error::DataDirNotFound)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

impl DocumentStorage for JsonFileStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            debug!("No stored value for '{}' at {}", key, path.display());
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| Error::StorageLoad {
                key: key.to_string(),
                source: Box::new(e),
            })
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        let save_err = |e: std::io::Error| Error::StorageSave {
            key: key.to_string(),
            source: Box::new(e),
        };

        if !self.dir.exists() {
            debug!("Creating storage directory: {}", self.dir.display());
            fs::create_dir_all(&self.dir).map_err(save_err)?;
        }

        // Write next to the target, then rename over it
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value).map_err(save_err)?;
        fs::rename(&tmp, &path).map_err(save_err)?;

        debug!("Saved '{}' ({} bytes) to {}", key, value.len(), path.display());
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// In Memory
// ─────────────────────────────────────────────────────────────────────────────

/// Storage held in memory, for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
    /// Make every `save` fail
    pub fail_saves: bool,
    /// Number of successful saves
    pub save_count: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a key.
    pub fn with_value(mut self, key: &str, value: impl Into<String>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl DocumentStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_saves {
            warn!("Memory storage refusing save of '{}'", key);
            return Err(Error::StorageSave {
                key: key.to_string(),
                source: "storage quota exceeded".into(),
            });
        }
        self.values.insert(key.to_string(), value.to_string());
        self.save_count += 1;
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
