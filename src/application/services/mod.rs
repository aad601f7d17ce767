//! Application services.

mod playback_service;

pub use playback_service::{PlaybackController, format_ms, format_remaining_ms};
