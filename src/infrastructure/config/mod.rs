//! Application configuration.

pub mod app_config;
pub mod args;
pub mod state_config;
pub mod storage;

pub use app_config::{AppConfig, ClientConfig, HttpConfig, ImagesConfig, LogLevel, PlayerConfig};
pub use args::{CliArgs, Command, LibraryArgs, LoginArgs};
pub use state_config::StateConfig;
pub use storage::{ConfigError, StorageManager};
