//! Jellyfin server port for authentication and library queries.

use async_trait::async_trait;

use crate::domain::entities::{
    Album, Artist, MediaLibrary, RemoteSession, ServerInfo, ServerUrl, Session, Track,
};
use crate::domain::errors::ApiError;

/// Which albums to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumScope {
    /// Every album in a library, recursively.
    Library(String),
    /// Albums parented by an artist.
    Artist(String),
}

/// Which tracks to list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackScope {
    /// Every track in a library, recursively.
    Library(String),
    /// Tracks of one album in disc order.
    Album(String),
    /// Every track credited to an artist.
    Artist(String),
}

impl TrackScope {
    /// Picks the narrowest scope for the current selection.
    ///
    /// A selected album wins over a selected artist, and the library is the
    /// fallback when nothing is selected.
    #[must_use]
    pub fn from_selection(library_id: &str, artist_id: Option<&str>, album_id: Option<&str>) -> Self {
        match (artist_id, album_id) {
            (_, Some(album)) => Self::Album(album.to_string()),
            (Some(artist), None) => Self::Artist(artist.to_string()),
            (None, None) => Self::Library(library_id.to_string()),
        }
    }
}

/// Port for Jellyfin REST operations.
///
/// Implementations are stateless: every authenticated call receives the
/// session it runs under.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JellyfinPort: Send + Sync {
    /// Fetches public server information (no authentication required).
    async fn public_system_info(&self, server_url: &ServerUrl) -> Result<ServerInfo, ApiError>;

    /// Authenticates by user name and password.
    async fn authenticate(
        &self,
        server_url: &ServerUrl,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError>;

    /// Lists the user's top level views.
    async fn media_libraries(&self, session: &Session) -> Result<Vec<MediaLibrary>, ApiError>;

    /// Lists artists in a library.
    async fn artists(&self, session: &Session, library_id: &str) -> Result<Vec<Artist>, ApiError>;

    /// Lists albums.
    async fn albums(&self, session: &Session, scope: &AlbumScope) -> Result<Vec<Album>, ApiError>;

    /// Lists tracks.
    async fn tracks(&self, session: &Session, scope: &TrackScope) -> Result<Vec<Track>, ApiError>;

    /// Searches tracks by free text.
    async fn search_tracks(&self, session: &Session, query: &str) -> Result<Vec<Track>, ApiError>;

    /// Lists client sessions connected to the server.
    async fn sessions(&self, session: &Session) -> Result<Vec<RemoteSession>, ApiError>;

    /// Tells another session to play a track now.
    async fn play_on_session(
        &self,
        session: &Session,
        remote_session_id: &str,
        track_id: &str,
    ) -> Result<(), ApiError>;
}
