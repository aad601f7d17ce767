//! Music library entities: libraries, artists, albums and tracks.

use std::collections::HashMap;
use std::time::Duration;

use super::session::Session;

/// Default artwork edge length requested from the server.
pub const DEFAULT_ARTWORK_SIZE: u32 = 300;

/// Fallback label for albums without artist metadata.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

const PRIMARY_IMAGE: &str = "Primary";
const TICKS_PER_MICROSECOND: u64 = 10;

/// Requested artwork dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtworkSize {
    /// Fill width in pixels.
    pub width: u32,
    /// Fill height in pixels.
    pub height: u32,
}

impl ArtworkSize {
    /// Creates a size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for ArtworkSize {
    fn default() -> Self {
        Self::new(DEFAULT_ARTWORK_SIZE, DEFAULT_ARTWORK_SIZE)
    }
}

/// Builds the URL of an item's primary image.
///
/// Returns `None` when the item has no ID or no primary image tag.
#[must_use]
pub fn primary_image_url(
    session: &Session,
    item_id: &str,
    tag: Option<&str>,
    size: ArtworkSize,
) -> Option<String> {
    let tag = tag.filter(|t| !t.is_empty())?;
    if item_id.is_empty() {
        return None;
    }

    Some(format!(
        "{}?tag={tag}&quality=90&fillWidth={}&fillHeight={}&cropWhitespace=true&api_key={}",
        session
            .server_url()
            .join(&format!("Items/{item_id}/Images/Primary")),
        size.width,
        size.height,
        session.access_token().as_str()
    ))
}

/// A top level user view such as "Music" or "Movies".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaLibrary {
    /// Library ID.
    pub id: String,
    /// Library name.
    pub name: String,
    /// Collection type, e.g. "music", "movies", "tvshows".
    pub collection_type: Option<String>,
}

impl MediaLibrary {
    /// Returns true for music libraries.
    #[must_use]
    pub fn is_music(&self) -> bool {
        self.collection_type.as_deref() == Some("music")
    }

    /// Name with collection type, e.g. "Music (music)".
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{} ({})",
            self.name,
            self.collection_type.as_deref().unwrap_or("mixed")
        )
    }
}

/// A music artist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artist {
    /// Artist ID.
    pub id: String,
    /// Artist name.
    pub name: String,
    /// Image type to image tag.
    pub image_tags: HashMap<String, String>,
    /// Genres.
    pub genres: Vec<String>,
    /// Year of first production, if known.
    pub production_year: Option<i32>,
}

impl Artist {
    /// URL of the artist's primary image.
    #[must_use]
    pub fn primary_image_url(&self, session: &Session, size: ArtworkSize) -> Option<String> {
        primary_image_url(
            session,
            &self.id,
            self.image_tags.get(PRIMARY_IMAGE).map(String::as_str),
            size,
        )
    }
}

/// A music album.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Album {
    /// Album ID.
    pub id: String,
    /// Album title.
    pub title: String,
    /// Release year.
    pub production_year: Option<i32>,
    /// Credited album artists.
    pub album_artists: Vec<String>,
    /// Whether the current user marked the album as favorite.
    pub is_favorite: bool,
    /// Image type to image tag.
    pub image_tags: HashMap<String, String>,
}

impl Album {
    /// First credited artist or [`UNKNOWN_ARTIST`].
    #[must_use]
    pub fn album_artist(&self) -> &str {
        self.album_artists
            .first()
            .map_or(UNKNOWN_ARTIST, String::as_str)
    }

    /// All credited artists joined with ", ".
    #[must_use]
    pub fn album_artists_joined(&self) -> String {
        self.album_artists.join(", ")
    }

    /// Secondary line shown under the title.
    ///
    /// When browsing a single artist the year is more useful than the
    /// (identical) artist name.
    #[must_use]
    pub fn subtitle(&self, scoped_to_artist: bool) -> String {
        if scoped_to_artist {
            self.production_year
                .map_or_else(String::new, |year| year.to_string())
        } else {
            self.album_artist().to_string()
        }
    }

    /// URL of the album cover.
    #[must_use]
    pub fn primary_image_url(&self, session: &Session, size: ArtworkSize) -> Option<String> {
        primary_image_url(
            session,
            &self.id,
            self.image_tags.get(PRIMARY_IMAGE).map(String::as_str),
            size,
        )
    }
}

/// A single audio track.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Track {
    /// Track ID.
    pub id: String,
    /// Track title.
    pub title: String,
    /// Parent album ID.
    pub album_id: Option<String>,
    /// Parent album title.
    pub album: Option<String>,
    /// Album artist name.
    pub album_artist: Option<String>,
    /// Position on the album.
    pub index_number: Option<u32>,
    /// Length in 100 ns ticks.
    pub run_time_ticks: Option<u64>,
    /// Primary image tag of the parent album.
    pub album_image_tag: Option<String>,
}

impl Track {
    /// Track length.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_micros(self.run_time_ticks.unwrap_or(0) / TICKS_PER_MICROSECOND)
    }

    /// Album artist or [`UNKNOWN_ARTIST`].
    #[must_use]
    pub fn artist(&self) -> &str {
        self.album_artist.as_deref().unwrap_or(UNKNOWN_ARTIST)
    }

    /// URL of the parent album's cover.
    #[must_use]
    pub fn album_art_url(&self, session: &Session, size: ArtworkSize) -> Option<String> {
        primary_image_url(
            session,
            self.album_id.as_deref()?,
            self.album_image_tag.as_deref(),
            size,
        )
    }
}
