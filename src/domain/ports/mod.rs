mod audio_port;
mod credential_storage_port;
mod image_cache_port;
mod jellyfin_port;

pub use audio_port::AudioBackendPort;
pub use credential_storage_port::CredentialStoragePort;
pub use image_cache_port::{CacheError, CacheResult, ImageCachePort, ImageFetcherPort};
pub use jellyfin_port::{AlbumScope, JellyfinPort, TrackScope};

/// Test doubles for every port.
#[cfg(test)]
pub mod mocks {
    pub use super::audio_port::mock::{BackendCall, MockAudioBackend};
    pub use super::credential_storage_port::mock::MockCredentialStorage;
    pub use super::image_cache_port::mock::{MockImageFetcher, png_bytes};
    pub use super::jellyfin_port::MockJellyfinPort;
}
