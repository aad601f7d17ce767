//! Plain text tables for terminal output.

use std::fmt::Write as _;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::application::services::format_ms;
use crate::domain::entities::{Album, Artist, MediaLibrary, RemoteSession, Track};

/// Widest a single cell may be before it is truncated.
const MAX_CELL_WIDTH: usize = 48;
const COLUMN_GAP: &str = "  ";

/// Column aligned table measured in terminal cells, so wide glyphs line up.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Creates a table with the given column headers.
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Appends a row. Missing cells render empty; extra cells are dropped.
    pub fn push<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row
            .into_iter()
            .map(|cell| truncate(&cell.into(), MAX_CELL_WIDTH))
            .collect();
        row.resize(self.headers.len(), String::new());
        self.rows.push(row);
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders header and rows, one line each.
    #[must_use]
    pub fn render(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                self.rows
                    .iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(header.width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = String::new();
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            let mut line = String::new();
            for (i, (cell, width)) in row.iter().zip(&widths).enumerate() {
                if i > 0 {
                    line.push_str(COLUMN_GAP);
                }
                line.push_str(cell);
                line.extend(std::iter::repeat_n(' ', width.saturating_sub(cell.width())));
            }
            let _ = writeln!(out, "{}", line.trim_end());
        }
        out
    }
}

/// Shortens `text` to at most `max_width` terminal cells, ending in `…`.
#[must_use]
pub fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    let budget = max_width.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Table of media libraries.
#[must_use]
pub fn libraries_table(libraries: &[MediaLibrary]) -> Table {
    let mut table = Table::new(["ID", "NAME", "TYPE"]);
    for library in libraries {
        table.push([
            library.id.clone(),
            library.name.clone(),
            library.collection_type.clone().unwrap_or_default(),
        ]);
    }
    table
}

/// Table of artists.
#[must_use]
pub fn artists_table(artists: &[Artist]) -> Table {
    let mut table = Table::new(["ID", "NAME", "GENRES"]);
    for artist in artists {
        table.push([artist.id.clone(), artist.name.clone(), artist.genres.join(", ")]);
    }
    table
}

/// Table of albums. Inside an artist the second column shows the year.
#[must_use]
pub fn albums_table(albums: &[Album], scoped_to_artist: bool) -> Table {
    let second = if scoped_to_artist { "YEAR" } else { "ARTIST" };
    let mut table = Table::new(["ID", "TITLE", second, "FAV"]);
    for album in albums {
        table.push([
            album.id.clone(),
            album.title.clone(),
            album.subtitle(scoped_to_artist),
            if album.is_favorite { "*" } else { "" }.to_string(),
        ]);
    }
    table
}

/// Table of tracks.
#[must_use]
pub fn tracks_table(tracks: &[Track]) -> Table {
    let mut table = Table::new(["#", "ID", "TITLE", "ARTIST", "ALBUM", "TIME"]);
    for track in tracks {
        let millis = i64::try_from(track.duration().as_millis()).unwrap_or(i64::MAX);
        table.push([
            track.index_number.map(|n| n.to_string()).unwrap_or_default(),
            track.id.clone(),
            track.title.clone(),
            track.artist().to_string(),
            track.album.clone().unwrap_or_default(),
            format_ms(millis),
        ]);
    }
    table
}

/// Table of remote sessions.
#[must_use]
pub fn sessions_table(sessions: &[RemoteSession]) -> Table {
    let mut table = Table::new(["ID", "USER", "CLIENT", "DEVICE", "PLAYING", "REMOTE"]);
    for session in sessions {
        table.push([
            session.id.clone(),
            session.user_name.clone(),
            session.client.clone(),
            session.device_name.clone(),
            session.now_playing_item_id.clone().unwrap_or_default(),
            if session.supports_remote_control { "yes" } else { "no" }.to_string(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_align_by_display_width() {
        let mut table = Table::new(["NAME", "N"]);
        table.push(["坂本龍一", "1"]);
        table.push(["Abba", "2"]);

        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "NAME      N");
        assert_eq!(lines[1], "坂本龍一  1");
        assert_eq!(lines[2], "Abba      2");
    }

    #[test]
    fn test_truncate_respects_wide_glyphs() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("坂本龍一", 5), "坂本…");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let mut table = Table::new(["A", "B", "C"]);
        table.push(["x"]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.render().lines().nth(1), Some("x"));
    }

    #[test]
    fn test_albums_table_scoped_to_artist_shows_year() {
        let album = Album {
            id: "a".to_string(),
            title: "Kind of Blue".to_string(),
            production_year: Some(1959),
            album_artists: vec!["Miles Davis".to_string()],
            is_favorite: true,
            ..Album::default()
        };

        let rendered = albums_table(std::slice::from_ref(&album), true).render();
        assert!(rendered.contains("YEAR"));
        assert!(rendered.contains("1959"));
        assert!(!rendered.contains("Miles Davis"));

        let rendered = albums_table(&[album], false).render();
        assert!(rendered.contains("Miles Davis"));
    }

    #[test]
    fn test_tracks_table_formats_duration() {
        let track = Track {
            id: "t".to_string(),
            title: "So What".to_string(),
            index_number: Some(1),
            run_time_ticks: Some(5_650_000_000),
            ..Track::default()
        };

        let rendered = tracks_table(&[track]).render();

        assert!(rendered.contains("9:25"));
        assert!(rendered.contains("Unknown Artist"));
    }
}
