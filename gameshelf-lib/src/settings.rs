//! Application settings (database location, seed data directory).
//!
//! The settings file lives at `~/.config/gameshelf/settings.toml`. It is
//! written with defaults the first time it is looked for, so a fresh install
//! always has a file to edit.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Invalid settings in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// SQLite database file.
    pub database: PathBuf,
    /// Directory holding one CSV seed file per table.
    pub seed_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let data = data_dir();
        Self {
            database: data.join("gameshelf.db"),
            seed_dir: data.join("seed"),
        }
    }
}

/// Canonical path to the settings file: `~/.config/gameshelf/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("gameshelf").join("settings.toml")
}

/// Default directory for the database and seed files.
pub fn data_dir() -> PathBuf {
    let data = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    data.join("gameshelf")
}

/// Read settings from `path`. Missing keys take their defaults.
pub fn load(path: &Path) -> Result<Settings, SettingsError> {
    let contents = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| SettingsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write settings to `path` atomically (temp file, then rename).
pub fn save(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    let io_error = |source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    let serialized = toml::to_string_pretty(settings)?;
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, &serialized).map_err(io_error)?;
    std::fs::rename(&tmp, path).map_err(io_error)?;
    Ok(())
}

/// Load settings from `path`, creating the file with defaults if absent.
pub fn load_or_create(path: &Path) -> Result<Settings, SettingsError> {
    if path.exists() {
        return load(path);
    }
    let settings = Settings::default();
    save(&settings, path)?;
    log::info!("Wrote default settings to {}", path.display());
    Ok(settings)
}
