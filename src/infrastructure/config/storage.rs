//! TOML persistence for `config.toml` and `state.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::AppConfig;
use super::state_config::StateConfig;

const CONFIG_FILE_NAME: &str = "config.toml";
const STATE_FILE_NAME: &str = "state.toml";

/// Configuration and state file errors.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("no home directory to keep configuration in")]
    ConfigDirNotFound,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize settings: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Owns the configuration directory and the files inside it.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform configuration directory.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigDirNotFound` without a home directory.
    pub fn new() -> Result<Self, ConfigError> {
        AppConfig::default_config_dir()
            .map(Self::with_dir)
            .ok_or(ConfigError::ConfigDirNotFound)
    }

    /// Uses `config_dir` instead of the platform directory.
    #[must_use]
    pub const fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Directory holding the settings files.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of `state.toml`.
    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.config_dir.join(STATE_FILE_NAME)
    }

    /// Creates the configuration directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be created.
    pub fn ensure_config_dir(&self) -> Result<(), ConfigError> {
        if !self.config_dir.exists() {
            info!(path = ?self.config_dir, "Creating configuration directory");
            fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Loads `config.toml`, or the file at `path_override`.
    ///
    /// A missing file is created with defaults. A file that does not parse
    /// is left untouched and defaults are used for this run.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on I/O failure.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        self.ensure_config_dir()?;
        let path = path_override.map_or_else(|| self.config_dir.join(CONFIG_FILE_NAME), Path::to_path_buf);

        if !path.exists() {
            info!(path = ?path, "Config file not found, writing defaults");
            let config = AppConfig::default();
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            write_atomically(&path, &config)?;
            return Ok(config);
        }

        read_or_default(&path, "config")
    }

    /// Loads `state.toml`. Missing or unreadable state starts fresh.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on I/O failure.
    pub fn load_state(&self) -> Result<StateConfig, ConfigError> {
        self.ensure_config_dir()?;
        let path = self.state_path();
        if !path.exists() {
            return Ok(StateConfig::default());
        }
        read_or_default(&path, "state")
    }

    /// Writes `state.toml`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_state(&self, state: &StateConfig) -> Result<(), ConfigError> {
        self.ensure_config_dir()?;
        write_atomically(&self.state_path(), state)
    }
}

fn read_or_default<T: DeserializeOwned + Default>(path: &Path, kind: &str) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path)?;
    match toml::from_str::<T>(&content) {
        Ok(value) => {
            debug!(path = ?path, kind, "Loaded settings file");
            Ok(value)
        }
        Err(e) => {
            warn!(path = ?path, kind, error = %e, "Settings file does not parse, using defaults");
            Ok(T::default())
        }
    }
}

/// Writes through a temp file in the same directory, then renames.
fn write_atomically<T: Serialize>(path: &Path, data: &T) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(data)?;
    let parent = path
        .parent()
        .ok_or_else(|| std::io::Error::other("settings path has no parent"))?;

    let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
    temp_file.write_all(content.as_bytes())?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}
