//! Domain entity definitions.

mod credentials;
mod image;
mod library;
mod playback;
mod session;
mod token;

pub use credentials::UserCredentials;
pub use image::Bitmap;
pub use library::{
    Album, Artist, ArtworkSize, DEFAULT_ARTWORK_SIZE, MediaLibrary, Track, UNKNOWN_ARTIST,
    primary_image_url,
};
pub use playback::{BackendEvent, DEFAULT_VOLUME, MAX_VOLUME, PlaybackEvent, PlaybackState};
pub use session::{
    ClientIdentity, DEFAULT_CLIENT_NAME, DEFAULT_CONTAINER, DEFAULT_DEVICE_NAME, RemoteSession,
    ServerInfo, ServerUrl, Session,
};
pub use token::AccessToken;
