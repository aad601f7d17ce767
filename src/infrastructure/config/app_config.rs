//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::domain::entities::{ArtworkSize, DEFAULT_ARTWORK_SIZE, DEFAULT_CLIENT_NAME, DEFAULT_DEVICE_NAME};
use crate::infrastructure::image::DEFAULT_CACHE_SIZE;

const APP_NAME: &str = "jambox";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "jambox";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration, read from `config.toml`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Image cache settings.
    #[serde(default)]
    pub images: ImagesConfig,

    /// HTTP settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// External player settings.
    #[serde(default)]
    pub player: PlayerConfig,

    /// How the client identifies itself to the server.
    #[serde(default)]
    pub client: ClientConfig,
}

/// Image cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    /// Maximum number of decoded images kept in memory.
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,

    /// Requested artwork width in pixels.
    #[serde(default = "default_artwork_size")]
    pub width: u32,

    /// Requested artwork height in pixels.
    #[serde(default = "default_artwork_size")]
    pub height: u32,
}

impl ImagesConfig {
    /// Artwork size requested from the server.
    #[must_use]
    pub const fn artwork_size(&self) -> ArtworkSize {
        ArtworkSize::new(self.width, self.height)
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_SIZE,
            width: DEFAULT_ARTWORK_SIZE,
            height: DEFAULT_ARTWORK_SIZE,
        }
    }
}

/// HTTP client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of items returned by list queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_limit: Option<u32>,
}

impl HttpConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            item_limit: None,
        }
    }
}

/// External player configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Player executable.
    #[serde(default = "default_player_command")]
    pub command: String,

    /// Extra arguments passed before the stream URL.
    #[serde(default = "default_player_args")]
    pub args: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: default_player_command(),
            args: default_player_args(),
        }
    }
}

/// Client identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Client name reported to the server.
    #[serde(default = "default_client_name")]
    pub name: String,

    /// Device name reported to the server.
    #[serde(default = "default_device_name")]
    pub device: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            name: default_client_name(),
            device: default_device_name(),
        }
    }
}

const fn default_cache_capacity() -> usize {
    DEFAULT_CACHE_SIZE
}

const fn default_artwork_size() -> u32 {
    DEFAULT_ARTWORK_SIZE
}

const fn default_timeout_secs() -> u64 {
    30
}

fn default_player_command() -> String {
    "mpv".to_string()
}

fn default_player_args() -> Vec<String> {
    vec!["--no-video".to_string(), "--really-quiet".to_string()]
}

fn default_client_name() -> String {
    DEFAULT_CLIENT_NAME.to_string()
}

fn default_device_name() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(config_path) = &args.config {
            self.config = Some(config_path.clone());
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(capacity) = args.cache_size {
            self.images.capacity = capacity;
        }
        if let Some(limit) = args.limit {
            self.http.item_limit = Some(limit);
        }
        if let Some(timeout) = args.timeout {
            self.http.timeout_secs = timeout;
        }
        if let Some(player) = &args.player {
            self.player.command.clone_from(player);
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("jambox.log"))
    }

    /// Returns effective log path.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path.clone().or_else(Self::default_log_path)
    }
}
