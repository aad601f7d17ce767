use super::app_config::LogLevel;
use crate::application::use_cases::{AlbumSort, ArtistSort, TrackSort};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "jambox",
    version,
    about = "A small Jellyfin music client",
    long_about = None
)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Maximum number of images kept in memory.
    #[arg(long, value_name = "N", global = true)]
    pub cache_size: Option<usize>,

    /// Maximum number of items returned by list queries.
    #[arg(long, value_name = "N", global = true)]
    pub limit: Option<u32>,

    /// HTTP request timeout in seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout: Option<u64>,

    /// External player command used by `play`.
    #[arg(long, value_name = "CMD", global = true)]
    pub player: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Server address and user credentials.
#[derive(Debug, Clone, Args)]
pub struct LoginArgs {
    /// Server URL, e.g. `http://localhost:8096`.
    #[arg(long, env = "JAMBOX_SERVER")]
    pub server: String,

    /// User name.
    #[arg(short, long, env = "JAMBOX_USERNAME")]
    pub username: String,

    /// Password.
    #[arg(short, long, env = "JAMBOX_PASSWORD", hide_env_values = true, default_value = "")]
    pub password: String,

    /// Do not store the credentials in the system keyring.
    #[arg(long)]
    pub no_save: bool,
}

/// Library selection shared by the browsing commands.
#[derive(Debug, Clone, Default, Args)]
pub struct LibraryArgs {
    /// Library ID (defaults to the last used or first music library).
    #[arg(long)]
    pub library: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Log in and remember the credentials.
    Login(LoginArgs),

    /// Forget stored credentials.
    Logout,

    /// List media libraries.
    Libraries,

    /// List artists of a library.
    Artists {
        #[command(flatten)]
        library: LibraryArgs,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = ArtistSort::NameAsc)]
        sort: ArtistSort,
    },

    /// List albums of a library or an artist.
    Albums {
        #[command(flatten)]
        library: LibraryArgs,
        /// Only albums of this artist.
        #[arg(long)]
        artist: Option<String>,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = AlbumSort::Name)]
        sort: AlbumSort,
    },

    /// List tracks of a library, an artist or an album.
    Tracks {
        #[command(flatten)]
        library: LibraryArgs,
        /// Only tracks of this artist.
        #[arg(long)]
        artist: Option<String>,
        /// Only tracks of this album.
        #[arg(long)]
        album: Option<String>,
        /// Sort order.
        #[arg(long, value_enum, default_value_t = TrackSort::AlbumOrder)]
        sort: TrackSort,
    },

    /// Search tracks by title.
    Search {
        /// Search text.
        query: String,
    },

    /// List client sessions connected to the server.
    Sessions,

    /// Play a track on another session.
    RemotePlay {
        /// Target session ID.
        session: String,
        /// Track ID.
        track: String,
    },

    /// Print the stream URL of a track.
    StreamUrl {
        /// Track ID.
        track: String,
        /// Audio container to transcode to.
        #[arg(long, default_value = crate::domain::entities::DEFAULT_CONTAINER)]
        container: String,
    },

    /// Load album covers through the image cache.
    Covers {
        #[command(flatten)]
        library: LibraryArgs,
        /// Only albums of this artist.
        #[arg(long)]
        artist: Option<String>,
    },

    /// Play an album or search results with the external player.
    Play {
        /// Album ID to play.
        #[arg(long, conflicts_with = "search", required_unless_present = "search")]
        album: Option<String>,
        /// Play the results of this search.
        #[arg(long)]
        search: Option<String>,
        /// Index of the first track.
        #[arg(long, default_value_t = 0)]
        start: usize,
    },
}
