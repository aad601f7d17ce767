//! Audio backend that hands the stream to an external player process.

use std::path::Path;
use std::process::{ExitStatus, Stdio};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::domain::entities::BackendEvent;
use crate::domain::errors::AudioError;
use crate::domain::ports::AudioBackendPort;

/// Plays each track by spawning `command [args…] <url>`.
///
/// The process can only be started and killed, so pausing, seeking and
/// volume changes report [`AudioError::Unsupported`]. A process that exits
/// with status 0 produces [`BackendEvent::EndReached`]; one killed through
/// [`AudioBackendPort::stop`] produces nothing.
pub struct ExternalPlayerBackend {
    command: String,
    args: Vec<String>,
    events: mpsc::UnboundedSender<BackendEvent>,
    current: Mutex<Option<oneshot::Sender<()>>>,
}

impl ExternalPlayerBackend {
    /// Creates a backend that reports to `events`.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        events: mpsc::UnboundedSender<BackendEvent>,
    ) -> Self {
        Self {
            command: command.into(),
            args,
            events,
            current: Mutex::new(None),
        }
    }

    /// Player executable.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    fn is_mpv(&self) -> bool {
        Path::new(&self.command)
            .file_stem()
            .is_some_and(|stem| stem == "mpv")
    }

    /// Extra arguments carrying HTTP headers, for players known to take them.
    fn header_args(&self, headers: &[(String, String)]) -> Vec<String> {
        if headers.is_empty() || !self.is_mpv() {
            return Vec::new();
        }
        let fields: Vec<String> = headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect();
        vec![format!("--http-header-fields={}", fields.join(","))]
    }

    fn stop_current(&self) -> bool {
        self.current
            .lock()
            .take()
            .is_some_and(|stop_tx| stop_tx.send(()).is_ok())
    }

    async fn supervise(
        mut child: Child,
        stop_rx: oneshot::Receiver<()>,
        events: mpsc::UnboundedSender<BackendEvent>,
    ) {
        tokio::select! {
            status = child.wait() => {
                let event = match status {
                    Ok(status) => Self::exit_event(status),
                    Err(e) => BackendEvent::Error(e.to_string()),
                };
                debug!(event = ?event, "Player process exited");
                let _ = events.send(event);
            }
            _ = stop_rx => {
                if let Err(e) = child.kill().await {
                    warn!(error = %e, "Failed to kill player process");
                }
                debug!("Player process stopped");
            }
        }
    }

    fn exit_event(status: ExitStatus) -> BackendEvent {
        if status.success() {
            BackendEvent::EndReached
        } else if let Some(code) = status.code() {
            BackendEvent::Error(format!("player exited with status {code}"))
        } else {
            BackendEvent::Stopped
        }
    }
}

#[async_trait]
impl AudioBackendPort for ExternalPlayerBackend {
    async fn play(&self, url: &str, headers: &[(String, String)]) -> Result<(), AudioError> {
        self.stop_current();

        let child = Command::new(&self.command)
            .args(&self.args)
            .args(self.header_args(headers))
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                warn!(command = %self.command, error = %e, "Failed to start player");
                AudioError::StartFailed(format!("{}: {e}", self.command))
            })?;

        info!(command = %self.command, pid = ?child.id(), "Player started");

        let (stop_tx, stop_rx) = oneshot::channel();
        *self.current.lock() = Some(stop_tx);
        let _ = self.events.send(BackendEvent::Playing);
        tokio::spawn(Self::supervise(child, stop_rx, self.events.clone()));

        Ok(())
    }

    fn pause(&self) -> Result<(), AudioError> {
        Err(AudioError::Unsupported("pause"))
    }

    fn resume(&self) -> Result<(), AudioError> {
        Err(AudioError::Unsupported("resume"))
    }

    fn stop(&self) -> Result<(), AudioError> {
        if self.stop_current() {
            debug!("Stop requested");
        }
        Ok(())
    }

    fn seek(&self, _position_ms: u64) -> Result<(), AudioError> {
        Err(AudioError::Unsupported("seek"))
    }

    fn set_volume(&self, _volume: u8) -> Result<(), AudioError> {
        Err(AudioError::Unsupported("volume"))
    }
}

impl Drop for ExternalPlayerBackend {
    fn drop(&mut self) {
        self.stop_current();
    }
}
