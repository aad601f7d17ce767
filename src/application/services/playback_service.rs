//! Playlist playback state machine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::domain::entities::{
    BackendEvent, DEFAULT_VOLUME, MAX_VOLUME, PlaybackEvent, PlaybackState, Session, Track,
};
use crate::domain::errors::AudioError;
use crate::domain::ports::AudioBackendPort;

/// Formats a position as `m:ss`, or `h:mm:ss` from one hour on.
/// Negative positions format as `0:00`.
#[must_use]
pub fn format_ms(ms: i64) -> String {
    let total_secs = ms.max(0) / 1000;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/// Formats the time left as `-m:ss`.
#[must_use]
pub fn format_remaining_ms(position_ms: u64, length_ms: u64) -> String {
    let remaining = length_ms.saturating_sub(position_ms);
    format!("-{}", format_ms(i64::try_from(remaining).unwrap_or(i64::MAX)))
}

/// Drives an audio backend through a playlist.
///
/// Owned by one task: commands take `&mut self`, and backend notifications
/// are fed in through [`Self::handle_backend_event`]. Every observable
/// change is published on the event channel.
pub struct PlaybackController {
    backend: Arc<dyn AudioBackendPort>,
    session: Session,
    events: mpsc::UnboundedSender<PlaybackEvent>,
    playlist: Vec<Track>,
    current: Option<usize>,
    state: PlaybackState,
    volume: u8,
}

impl PlaybackController {
    /// Creates a stopped controller with an empty playlist.
    #[must_use]
    pub fn new(
        backend: Arc<dyn AudioBackendPort>,
        session: Session,
        events: mpsc::UnboundedSender<PlaybackEvent>,
    ) -> Self {
        Self {
            backend,
            session,
            events,
            playlist: Vec::new(),
            current: None,
            state: PlaybackState::Stopped,
            volume: DEFAULT_VOLUME,
        }
    }

    /// Transport state.
    #[must_use]
    pub const fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current volume.
    #[must_use]
    pub const fn volume(&self) -> u8 {
        self.volume
    }

    /// Tracks queued for playback.
    #[must_use]
    pub fn playlist(&self) -> &[Track] {
        &self.playlist
    }

    /// Index of the selected track.
    #[must_use]
    pub const fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// The selected track.
    #[must_use]
    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|index| self.playlist.get(index))
    }

    /// Whether [`Self::next`] would move.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|index| index + 1 < self.playlist.len())
    }

    /// Whether [`Self::previous`] would move.
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.current.is_some_and(|index| index > 0)
    }

    /// Replaces the playlist and selects `start_index`.
    ///
    /// Out of range indexes select nothing. Playback is not started.
    pub fn set_playlist(&mut self, tracks: Vec<Track>, start_index: usize) {
        debug!(count = tracks.len(), start_index, "Playlist set");
        self.playlist = tracks;
        self.current = None;
        if start_index < self.playlist.len() {
            self.select(start_index);
        }
    }

    /// Plays the selected track from the start, replacing current media.
    ///
    /// # Errors
    /// Returns error if no track is selected or the backend cannot start.
    pub async fn play(&mut self) -> Result<(), AudioError> {
        let track = self.current_track().ok_or(AudioError::NoTrackSelected)?;
        let url = self.session.file_url(&track.id);
        let title = track.title.clone();

        if let Err(e) = self.backend.stop() {
            debug!(error = %e, "Backend stop before play failed");
        }

        let headers = self.session.media_headers();
        let started = self.backend.play(&url, &headers).await;
        match started {
            Ok(()) => {
                info!(track = %title, "Playing");
                self.set_state(PlaybackState::Playing);
                Ok(())
            }
            Err(e) => {
                warn!(track = %title, error = %e, "Playback failed to start");
                self.set_state(PlaybackState::Stopped);
                Err(e)
            }
        }
    }

    /// Play/pause toggle: starts when stopped, pauses when playing, resumes
    /// when paused.
    ///
    /// # Errors
    /// Returns any error of the underlying command.
    pub async fn toggle(&mut self) -> Result<(), AudioError> {
        match self.state {
            PlaybackState::Stopped => self.play().await,
            PlaybackState::Playing => self.pause(),
            PlaybackState::Paused => self.resume(),
        }
    }

    /// Pauses playing media.
    ///
    /// # Errors
    /// Returns error unless playing, or if the backend cannot pause.
    pub fn pause(&mut self) -> Result<(), AudioError> {
        self.require(PlaybackState::Playing, "pause")?;
        self.backend.pause()?;
        self.set_state(PlaybackState::Paused);
        Ok(())
    }

    /// Resumes paused media.
    ///
    /// # Errors
    /// Returns error unless paused, or if the backend cannot resume.
    pub fn resume(&mut self) -> Result<(), AudioError> {
        self.require(PlaybackState::Paused, "resume")?;
        self.backend.resume()?;
        self.set_state(PlaybackState::Playing);
        Ok(())
    }

    /// Stops playing or paused media.
    ///
    /// # Errors
    /// Returns error when already stopped, or if the backend fails.
    pub fn stop(&mut self) -> Result<(), AudioError> {
        if !self.state.is_active() {
            return Err(AudioError::InvalidState {
                action: "stop",
                state: self.state,
            });
        }
        self.backend.stop()?;
        self.set_state(PlaybackState::Stopped);
        Ok(())
    }

    /// Selects and plays the next track. Returns false at the end of the
    /// playlist.
    ///
    /// # Errors
    /// Returns error if the backend cannot start.
    pub async fn next(&mut self) -> Result<bool, AudioError> {
        if !self.has_next() {
            return Ok(false);
        }
        let index = self.current.map_or(0, |index| index + 1);
        self.select(index);
        self.play().await.map(|()| true)
    }

    /// Selects and plays the previous track. Returns false at the start of
    /// the playlist.
    ///
    /// # Errors
    /// Returns error if the backend cannot start.
    pub async fn previous(&mut self) -> Result<bool, AudioError> {
        if !self.has_previous() {
            return Ok(false);
        }
        let index = self.current.map_or(0, |index| index.saturating_sub(1));
        self.select(index);
        self.play().await.map(|()| true)
    }

    /// Moves to `position_ms`; negative positions seek to the start.
    ///
    /// # Errors
    /// Returns error if no track is selected or the backend cannot seek.
    pub fn seek(&mut self, position_ms: i64) -> Result<(), AudioError> {
        if self.current_track().is_none() {
            return Err(AudioError::NoTrackSelected);
        }
        let position = u64::try_from(position_ms).unwrap_or(0);
        self.backend.seek(position)
    }

    /// Sets the volume, clamped to `0..=100`. Returns false when unchanged.
    ///
    /// # Errors
    /// Returns error if the backend cannot change volume.
    pub fn set_volume(&mut self, volume: i32) -> Result<bool, AudioError> {
        let volume = u8::try_from(volume.clamp(0, i32::from(MAX_VOLUME))).unwrap_or(MAX_VOLUME);
        if volume == self.volume {
            return Ok(false);
        }
        self.backend.set_volume(volume)?;
        self.volume = volume;
        self.emit(PlaybackEvent::VolumeChanged(volume));
        Ok(true)
    }

    /// Applies a notification from the backend.
    ///
    /// Reaching the end of a track advances to the next one; the controller
    /// stops after the last track.
    ///
    /// # Errors
    /// Returns error if auto-advance cannot start the next track.
    pub async fn handle_backend_event(&mut self, event: BackendEvent) -> Result<(), AudioError> {
        match event {
            BackendEvent::Playing => self.set_state(PlaybackState::Playing),
            BackendEvent::Paused => self.set_state(PlaybackState::Paused),
            BackendEvent::Stopped => self.set_state(PlaybackState::Stopped),
            BackendEvent::EndReached => {
                debug!(index = ?self.current, "Track finished");
                if !self.next().await? {
                    self.set_state(PlaybackState::Stopped);
                }
            }
            BackendEvent::Position {
                position_ms,
                length_ms,
            } => {
                self.emit(PlaybackEvent::PositionChanged {
                    position_ms,
                    length_ms,
                    elapsed: format_ms(i64::try_from(position_ms).unwrap_or(i64::MAX)),
                    remaining: format_remaining_ms(position_ms, length_ms),
                });
            }
            BackendEvent::Error(message) => {
                warn!(error = %message, "Audio backend error");
                self.set_state(PlaybackState::Stopped);
            }
        }
        Ok(())
    }

    fn select(&mut self, index: usize) {
        self.current = Some(index);
        if let Some(track) = self.playlist.get(index) {
            self.emit(PlaybackEvent::TrackChanged {
                track: Box::new(track.clone()),
                index,
            });
        }
    }

    fn require(&self, expected: PlaybackState, action: &'static str) -> Result<(), AudioError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(AudioError::InvalidState {
                action,
                state: self.state,
            })
        }
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "Playback state changed");
            self.state = state;
            self.emit(PlaybackEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.events.send(event);
    }
}
