//! Authentication DTOs.

use std::fmt;

use crate::domain::entities::{ServerInfo, Session, UserCredentials};

/// Where the login credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Command line flags or environment variables.
    Arguments,
    /// System keyring.
    Keyring,
}

impl CredentialSource {
    /// Returns human-readable description.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Arguments => "command line",
            Self::Keyring => "system keyring",
        }
    }
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Login request data.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Server address and login.
    pub credentials: UserCredentials,
    /// Credential source.
    pub source: CredentialSource,
    /// Whether to persist credentials after a successful login.
    pub persist_credentials: bool,
}

impl LoginRequest {
    /// Creates new login request.
    #[must_use]
    pub fn new(
        server_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            credentials: UserCredentials::new(server_url, username, password),
            source: CredentialSource::Arguments,
            persist_credentials: true,
        }
    }

    /// Disables credential persistence.
    #[must_use]
    pub fn without_persistence(mut self) -> Self {
        self.persist_credentials = false;
        self
    }
}

impl From<UserCredentials> for LoginRequest {
    /// Request for re-authenticating with stored credentials.
    fn from(credentials: UserCredentials) -> Self {
        Self {
            credentials,
            source: CredentialSource::Keyring,
            persist_credentials: false,
        }
    }
}

/// Login response data.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    /// Authenticated session.
    pub session: Session,
    /// Public server information.
    pub server_info: ServerInfo,
    /// Credential source used.
    pub source: CredentialSource,
    /// Whether credentials were persisted.
    pub credentials_persisted: bool,
}
