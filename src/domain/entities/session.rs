//! Server connection and authenticated session.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::token::AccessToken;

/// Default client name reported to the server.
pub const DEFAULT_CLIENT_NAME: &str = "JamBox";

/// Default device name reported to the server.
pub const DEFAULT_DEVICE_NAME: &str = "Desktop";

/// Default audio container for universal streaming.
pub const DEFAULT_CONTAINER: &str = "mp3";

/// Normalized Jellyfin server base URL without a trailing slash.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ServerUrl(String);

impl ServerUrl {
    /// Parses a user supplied server address.
    ///
    /// Only `http` and `https` URLs with a host part are accepted.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim().trim_end_matches('/');
        let rest = trimmed
            .strip_prefix("https://")
            .or_else(|| trimmed.strip_prefix("http://"))?;

        if rest.is_empty() || rest.starts_with('/') || rest.chars().any(char::is_whitespace) {
            return None;
        }

        Some(Self(trimmed.to_string()))
    }

    /// Returns the URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Joins a relative API path onto the base URL.
    #[must_use]
    pub fn join(&self, path: &str) -> String {
        format!("{}/{}", self.0, path.trim_start_matches('/'))
    }
}

impl fmt::Display for ServerUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ServerUrl {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid server url: {value}"))
    }
}

impl From<ServerUrl> for String {
    fn from(value: ServerUrl) -> Self {
        value.0
    }
}

/// How this client identifies itself to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    /// Client application name.
    pub client: String,
    /// Human readable device name.
    pub device: String,
    /// Stable device identifier.
    pub device_id: String,
    /// Client version.
    pub version: String,
}

impl ClientIdentity {
    /// Creates an identity with default names and the crate version.
    #[must_use]
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            client: DEFAULT_CLIENT_NAME.to_string(),
            device: DEFAULT_DEVICE_NAME.to_string(),
            device_id: device_id.into(),
            version: crate::VERSION.to_string(),
        }
    }

    /// Overrides client and device names.
    #[must_use]
    pub fn with_names(mut self, client: impl Into<String>, device: impl Into<String>) -> Self {
        self.client = client.into();
        self.device = device.into();
        self
    }

    /// Value of the `X-Emby-Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\"",
            self.client, self.device, self.device_id, self.version
        )
    }
}

/// An authenticated connection to a Jellyfin server.
#[derive(Debug, Clone)]
pub struct Session {
    server_url: ServerUrl,
    user_id: String,
    user_name: String,
    access_token: AccessToken,
    identity: ClientIdentity,
}

impl Session {
    /// Creates a session from an authentication result.
    #[must_use]
    pub fn new(
        server_url: ServerUrl,
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        access_token: AccessToken,
        identity: ClientIdentity,
    ) -> Self {
        Self {
            server_url,
            user_id: user_id.into(),
            user_name: user_name.into(),
            access_token,
            identity,
        }
    }

    /// Server base URL.
    #[must_use]
    pub const fn server_url(&self) -> &ServerUrl {
        &self.server_url
    }

    /// Authenticated user ID.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Authenticated user name.
    #[must_use]
    pub fn user_name(&self) -> &str {
        &self.user_name
    }

    /// Access token for subsequent requests.
    #[must_use]
    pub const fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Client identity used for this session.
    #[must_use]
    pub const fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    /// Universal audio stream URL, transcoded to `container` when needed.
    #[must_use]
    pub fn stream_url(&self, track_id: &str, container: &str) -> String {
        format!(
            "{}?UserId={}&DeviceId={}&Container={}&api_key={}",
            self.server_url.join(&format!("Audio/{track_id}/universal")),
            self.user_id,
            self.identity.device_id,
            container,
            self.access_token.as_str()
        )
    }

    /// Direct file URL for a track (original encoding, no transcoding).
    #[must_use]
    pub fn file_url(&self, track_id: &str) -> String {
        format!(
            "{}?api_key={}",
            self.server_url.join(&format!("Items/{track_id}/File")),
            self.access_token.as_str()
        )
    }

    /// Headers an external player needs to fetch authenticated media.
    #[must_use]
    pub fn media_headers(&self) -> Vec<(String, String)> {
        vec![(
            "X-Emby-Token".to_string(),
            self.access_token.as_str().to_string(),
        )]
    }
}

/// Public information about a server, available without authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInfo {
    /// Server display name.
    pub server_name: String,
    /// Server version string.
    pub version: String,
    /// Server ID.
    pub id: String,
}

impl fmt::Display for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (v{})", self.server_name, self.version)
    }
}

/// Another client session connected to the same server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSession {
    /// Session ID.
    pub id: String,
    /// Owning user name.
    pub user_name: String,
    /// Client name, e.g. "Jellyfin Web".
    pub client: String,
    /// Device name, e.g. "Living Room TV".
    pub device_name: String,
    /// Item currently playing on that session.
    pub now_playing_item_id: Option<String>,
    /// Whether the session accepts remote play commands.
    pub supports_remote_control: bool,
}
