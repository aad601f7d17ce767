//! Jellyfin API error types.

use thiserror::Error;

/// Errors returned by server calls and the login workflow.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ApiError {
    #[error("invalid server url: {url}")]
    InvalidServerUrl { url: String },

    #[error("could not reach server: {message}")]
    ServerUnreachable { message: String },

    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("not logged in")]
    NotAuthenticated,

    #[error("network error: {message}")]
    NetworkError { message: String },

    #[error("server returned {status}: {message}")]
    UnexpectedStatus { status: u16, message: String },

    #[error("failed to parse server response: {message}")]
    InvalidResponse { message: String },

    #[error("credential storage error: {0}")]
    Secret(#[from] super::SecretError),

    #[error("unexpected error: {message}")]
    Unexpected { message: String },
}

impl ApiError {
    /// Creates invalid server url error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>) -> Self {
        Self::InvalidServerUrl { url: url.into() }
    }

    /// Creates unreachable server error.
    #[must_use]
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::ServerUnreachable {
            message: message.into(),
        }
    }

    /// Creates authentication failed error.
    #[must_use]
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Creates network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::NetworkError {
            message: message.into(),
        }
    }

    /// Creates unexpected status error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::UnexpectedStatus {
            status,
            message: message.into(),
        }
    }

    /// Creates response parsing error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Creates unexpected error.
    #[must_use]
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }

    /// Returns whether retrying later may succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NetworkError { .. } | Self::ServerUnreachable { .. }
        ) || matches!(self, Self::UnexpectedStatus { status, .. } if *status >= 500)
    }

    /// Returns whether the user has to log in again.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::AuthenticationFailed { .. }
        ) || matches!(self, Self::UnexpectedStatus { status: 401, .. })
    }
}
