//! Audio backend error types.

use thiserror::Error;

/// Errors raised by the playback controller and audio backends.
#[derive(Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AudioError {
    #[error("no track selected")]
    NoTrackSelected,

    #[error("cannot {action} while {state}")]
    InvalidState {
        action: &'static str,
        state: crate::domain::entities::PlaybackState,
    },

    #[error("{0} is not supported by this audio backend")]
    Unsupported(&'static str),

    #[error("failed to start player: {0}")]
    StartFailed(String),

    #[error("audio backend error: {0}")]
    Backend(String),
}

impl AudioError {
    /// Returns whether the error only reflects a missing backend capability.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}
