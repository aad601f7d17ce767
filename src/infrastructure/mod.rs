//! Infrastructure layer with external service adapters.

/// External player audio backend.
pub mod audio;
/// Application configuration.
pub mod config;
/// Image fetching and caching.
pub mod image;
/// Jellyfin REST client.
pub mod jellyfin;
/// Credential storage adapters.
pub mod storage;

#[cfg(test)]
pub mod test_support;

pub use audio::ExternalPlayerBackend;
pub use config::{AppConfig, CliArgs, Command, LogLevel, StateConfig, StorageManager};
pub use image::{CacheStats, HttpImageFetcher, MemoryImageCache};
pub use jellyfin::JellyfinClient;
pub use storage::KeyringCredentialStorage;
