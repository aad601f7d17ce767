//! Application layer with use cases, services and DTOs.

/// Data transfer objects.
pub mod dto;
/// Long-lived application services.
pub mod services;
/// Use case implementations.
pub mod use_cases;

pub use dto::{CredentialSource, LoginRequest, LoginResponse};
pub use services::PlaybackController;
pub use use_cases::{AlbumSort, ArtistSort, LibraryBrowser, LoginUseCase, TrackSort};
