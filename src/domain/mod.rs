//! Domain layer with core business entities and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{Bitmap, Session, UserCredentials};
pub use errors::{ApiError, AudioError, SecretError};
pub use ports::{AudioBackendPort, CredentialStoragePort, ImageCachePort, JellyfinPort};
