//! Audio backend port definition.

use async_trait::async_trait;

use crate::domain::errors::AudioError;

/// Port for the external engine that decodes and outputs audio.
///
/// Backends report progress asynchronously through the
/// [`BackendEvent`](crate::domain::entities::BackendEvent) channel they were
/// created with.
#[async_trait]
pub trait AudioBackendPort: Send + Sync {
    /// Starts playing `url`, replacing any current media.
    async fn play(&self, url: &str, headers: &[(String, String)]) -> Result<(), AudioError>;

    /// Pauses the current media.
    fn pause(&self) -> Result<(), AudioError>;

    /// Resumes paused media.
    fn resume(&self) -> Result<(), AudioError>;

    /// Stops and unloads the current media.
    fn stop(&self) -> Result<(), AudioError>;

    /// Moves to an absolute position.
    fn seek(&self, position_ms: u64) -> Result<(), AudioError>;

    /// Sets output volume in the range `0..=100`.
    fn set_volume(&self, volume: u8) -> Result<(), AudioError>;
}

/// Recording audio backend for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use parking_lot::Mutex;

    /// Calls recorded by [`MockAudioBackend`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    #[allow(missing_docs)]
    pub enum BackendCall {
        Play(String),
        Pause,
        Resume,
        Stop,
        Seek(u64),
        Volume(u8),
    }

    /// Backend that records every call.
    #[derive(Default)]
    pub struct MockAudioBackend {
        calls: Mutex<Vec<BackendCall>>,
        fail_play: bool,
    }

    impl MockAudioBackend {
        /// Creates a backend that accepts every call.
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a backend whose `play` always fails.
        pub fn failing() -> Self {
            Self {
                fail_play: true,
                ..Self::default()
            }
        }

        /// Returns recorded calls.
        pub fn calls(&self) -> Vec<BackendCall> {
            self.calls.lock().clone()
        }

        fn record(&self, call: BackendCall) -> Result<(), AudioError> {
            self.calls.lock().push(call);
            Ok(())
        }
    }

    #[async_trait]
    impl AudioBackendPort for MockAudioBackend {
        async fn play(&self, url: &str, _headers: &[(String, String)]) -> Result<(), AudioError> {
            if self.fail_play {
                return Err(AudioError::StartFailed("mock failure".to_string()));
            }
            self.record(BackendCall::Play(url.to_string()))
        }

        fn pause(&self) -> Result<(), AudioError> {
            self.record(BackendCall::Pause)
        }

        fn resume(&self) -> Result<(), AudioError> {
            self.record(BackendCall::Resume)
        }

        fn stop(&self) -> Result<(), AudioError> {
            self.record(BackendCall::Stop)
        }

        fn seek(&self, position_ms: u64) -> Result<(), AudioError> {
            self.record(BackendCall::Seek(position_ms))
        }

        fn set_volume(&self, volume: u8) -> Result<(), AudioError> {
            self.record(BackendCall::Volume(volume))
        }
    }
}
