//! Playback state and notifications.

use super::library::Track;

/// Default player volume.
pub const DEFAULT_VOLUME: u8 = 80;

/// Maximum player volume.
pub const MAX_VOLUME: u8 = 100;

/// Transport state of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing is playing.
    #[default]
    Stopped,
    /// Media is playing.
    Playing,
    /// Media is loaded but paused.
    Paused,
}

impl PlaybackState {
    /// Returns true while media is loaded (playing or paused).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::Playing => write!(f, "playing"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// Notifications published by the playback controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Transport state changed.
    StateChanged(PlaybackState),
    /// A new track became current.
    TrackChanged {
        /// The track now selected.
        track: Box<Track>,
        /// Index in the playlist.
        index: usize,
    },
    /// Playback position advanced.
    PositionChanged {
        /// Position in milliseconds.
        position_ms: u64,
        /// Media length in milliseconds.
        length_ms: u64,
        /// Formatted elapsed time, e.g. "1:05".
        elapsed: String,
        /// Formatted remaining time, e.g. "-2:10".
        remaining: String,
    },
    /// Volume changed.
    VolumeChanged(u8),
}

/// Notifications emitted by an audio backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// Media started or resumed.
    Playing,
    /// Media paused.
    Paused,
    /// Media stopped on request.
    Stopped,
    /// Media played to the end.
    EndReached,
    /// Position update.
    Position {
        /// Position in milliseconds.
        position_ms: u64,
        /// Media length in milliseconds.
        length_ms: u64,
    },
    /// The backend failed; playback stops.
    Error(String),
}
