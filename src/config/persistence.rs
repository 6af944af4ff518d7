//! Settings file for NovaScribe
//!
//! Settings live in one JSON file in the platform config directory. A
//! missing or empty file means defaults; values out of range are clamped
//! on load. Writes go to a sibling temp file first and are renamed into
//! place, so a crash mid-write leaves the previous file intact.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Error, Result, ResultExt};

/// Application name used for the config and data directories
pub const APP_NAME: &str = "novascribe";

const CONFIG_FILE_NAME: &str = "config.json";

/// Extension of the temp file a save writes before renaming
const PARTIAL_EXTENSION: &str = "json.partial";

/// The settings file at a known location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    /// The settings file in the platform config directory.
    ///
    /// - **Windows**: `%APPDATA%\novascribe\config.json`
    /// - **macOS**: `~/Library/Application Support/novascribe/config.json`
    /// - **Linux**: `~/.config/novascribe/config.json`
    pub fn locate() -> Result<Self> {
        let dir = dirs::config_dir().ok_or(Error::DataDirNotFound)?;
        Ok(Self::at(dir.join(APP_NAME).join(CONFIG_FILE_NAME)))
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and sanitize the settings.
    ///
    /// A file that is missing or blank yields defaults; malformed JSON is a
    /// `Parse` error.
    pub fn load(&self) -> Result<Settings> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", self.path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };
        if contents.trim().is_empty() {
            return Ok(Settings::default());
        }

        let settings = Settings::from_json_sanitized(&contents).map_err(|e| Error::Parse {
            message: format!("invalid settings in {}", self.path.display()),
            source: Some(Box::new(e)),
        })?;
        info!("Loaded settings from {}", self.path.display());
        Ok(settings)
    }

    /// Write the settings, creating the directory if needed.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let save_error = |path: &Path, source: Box<dyn std::error::Error + Send + Sync>| {
            Error::ConfigSave {
                path: path.to_path_buf(),
                source,
            }
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| save_error(dir, Box::new(e)))?;
        }

        let json = serde_json::to_string_pretty(settings)
            .map_err(|e| save_error(&self.path, Box::new(e)))?;
        let partial = self.path.with_extension(PARTIAL_EXTENSION);
        fs::write(&partial, json).map_err(|e| save_error(&partial, Box::new(e)))?;
        fs::rename(&partial, &self.path).map_err(|e| save_error(&self.path, Box::new(e)))?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

/// Load settings from the platform config file, falling back to defaults
/// on any error.
pub fn load_config() -> Settings {
    ConfigFile::locate()
        .and_then(|file| file.load())
        .unwrap_or_warn_default(Settings::default(), "Failed to load settings")
}

/// Save settings to the platform config file. Failures are logged.
pub fn save_config(settings: &Settings) -> bool {
    match ConfigFile::locate().and_then(|file| file.save(settings)) {
        Ok(()) => true,
        Err(e) => {
            warn!("Failed to save settings: {}", e);
            false
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
