//! Library browsing with client side sorting.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{Album, Artist, MediaLibrary, Session, Track};
use crate::domain::errors::ApiError;
use crate::domain::ports::{AlbumScope, JellyfinPort, TrackScope};

/// Artist list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ArtistSort {
    /// A-Z.
    #[default]
    NameAsc,
    /// Z-A.
    NameDesc,
}

impl ArtistSort {
    /// Order selected by the sort toggle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::NameAsc => Self::NameDesc,
            Self::NameDesc => Self::NameAsc,
        }
    }

    /// Sorts in place.
    pub fn apply(self, artists: &mut [Artist]) {
        artists.sort_by(|a, b| compare_names(&a.name, &b.name));
        if self == Self::NameDesc {
            artists.reverse();
        }
    }
}

impl fmt::Display for ArtistSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameAsc => write!(f, "A-Z"),
            Self::NameDesc => write!(f, "Z-A"),
        }
    }
}

/// Album list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum AlbumSort {
    /// A-Z by title.
    #[default]
    Name,
    /// Newest first; albums without a year last.
    ReleaseYear,
    /// Favorites first.
    Favorite,
}

impl AlbumSort {
    /// Order selected by the sort toggle.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Name => Self::ReleaseYear,
            Self::ReleaseYear => Self::Favorite,
            Self::Favorite => Self::Name,
        }
    }

    /// Sorts in place. The sort is stable.
    pub fn apply(self, albums: &mut [Album]) {
        match self {
            Self::Name => albums.sort_by(|a, b| compare_names(&a.title, &b.title)),
            Self::ReleaseYear => {
                albums.sort_by(|a, b| descending_some_first(a.production_year, b.production_year));
            }
            Self::Favorite => albums.sort_by_key(|album| !album.is_favorite),
        }
    }
}

impl fmt::Display for AlbumSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "A-Z"),
            Self::ReleaseYear => write!(f, "BY RELEASE YEAR"),
            Self::Favorite => write!(f, "BY FAVORITE"),
        }
    }
}

/// Track list order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TrackSort {
    /// A-Z by title.
    #[default]
    Name,
    /// Disc order; tracks without a number last.
    AlbumOrder,
}

impl TrackSort {
    /// Order selected by the sort toggle.
    ///
    /// Album order only makes sense inside one album, so without a selected
    /// album the toggle stays on A-Z.
    #[must_use]
    pub const fn next(self, album_selected: bool) -> Self {
        match (self, album_selected) {
            (Self::Name, true) => Self::AlbumOrder,
            _ => Self::Name,
        }
    }

    /// Sorts in place. The sort is stable.
    pub fn apply(self, tracks: &mut [Track]) {
        match self {
            Self::Name => tracks.sort_by(|a, b| compare_names(&a.title, &b.title)),
            Self::AlbumOrder => tracks.sort_by(|a, b| match (a.index_number, b.index_number) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            }),
        }
    }
}

impl fmt::Display for TrackSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name => write!(f, "A-Z"),
            Self::AlbumOrder => write!(f, "BY ALBUM"),
        }
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn descending_some_first(a: Option<i32>, b: Option<i32>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Browses the libraries of one authenticated session.
#[derive(Clone)]
pub struct LibraryBrowser {
    jellyfin: Arc<dyn JellyfinPort>,
    session: Session,
}

impl LibraryBrowser {
    /// Creates a browser for `session`.
    #[must_use]
    pub fn new(jellyfin: Arc<dyn JellyfinPort>, session: Session) -> Self {
        Self { jellyfin, session }
    }

    /// Session used for every request.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Lists the user's libraries.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn libraries(&self) -> Result<Vec<MediaLibrary>, ApiError> {
        self.jellyfin.media_libraries(&self.session).await
    }

    /// First music library, if any.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn default_library(&self) -> Result<Option<MediaLibrary>, ApiError> {
        let library = self
            .libraries()
            .await?
            .into_iter()
            .find(MediaLibrary::is_music);
        debug!(library = ?library.as_ref().map(|l| &l.name), "Selected default library");
        Ok(library)
    }

    /// Lists artists of a library.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn artists(&self, library_id: &str, sort: ArtistSort) -> Result<Vec<Artist>, ApiError> {
        let mut artists = self.jellyfin.artists(&self.session, library_id).await?;
        sort.apply(&mut artists);
        debug!(count = artists.len(), sort = %sort, "Loaded artists");
        Ok(artists)
    }

    /// Lists albums of a library or an artist.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn albums(&self, scope: &AlbumScope, sort: AlbumSort) -> Result<Vec<Album>, ApiError> {
        let mut albums = self.jellyfin.albums(&self.session, scope).await?;
        sort.apply(&mut albums);
        debug!(count = albums.len(), sort = %sort, "Loaded albums");
        Ok(albums)
    }

    /// Lists tracks of a library, an artist or an album.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn tracks(&self, scope: &TrackScope, sort: TrackSort) -> Result<Vec<Track>, ApiError> {
        let mut tracks = self.jellyfin.tracks(&self.session, scope).await?;
        sort.apply(&mut tracks);
        debug!(count = tracks.len(), sort = %sort, "Loaded tracks");
        Ok(tracks)
    }

    /// Searches tracks by title. A blank query returns no tracks without
    /// contacting the server.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn search(&self, query: &str) -> Result<Vec<Track>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        self.jellyfin.search_tracks(&self.session, query).await
    }
}
