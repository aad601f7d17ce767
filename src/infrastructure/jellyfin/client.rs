//! Jellyfin REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use super::dto::{
    AuthenticateByNameRequest, AuthenticationResult, BaseItemDto, ItemsResponse, PlayRequest,
    PublicSystemInfoDto, SessionInfoDto,
};
use crate::domain::entities::{
    AccessToken, Album, Artist, ClientIdentity, MediaLibrary, RemoteSession, ServerInfo,
    ServerUrl, Session, Track,
};
use crate::domain::errors::ApiError;
use crate::domain::ports::{AlbumScope, JellyfinPort, TrackScope};

const AUTHORIZATION_HEADER: &str = "X-Emby-Authorization";
const TOKEN_HEADER: &str = "X-Emby-Token";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Item type filters understood by the `Items` endpoint.
const MUSIC_ARTIST: &str = "MusicArtist";
const MUSIC_ALBUM: &str = "MusicAlbum";
const AUDIO: &str = "Audio";

/// Jellyfin API client.
pub struct JellyfinClient {
    client: Client,
    identity: ClientIdentity,
    item_limit: Option<u32>,
}

impl JellyfinClient {
    /// Creates a client with the default timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(identity: ClientIdentity) -> Result<Self, ApiError> {
        Self::with_timeout(identity, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a client with a custom request timeout.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_timeout(identity: ClientIdentity, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(format!("{}/{}", identity.client, identity.version))
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            identity,
            item_limit: None,
        })
    }

    /// Caps the number of items returned by list queries.
    #[must_use]
    pub const fn with_item_limit(mut self, limit: Option<u32>) -> Self {
        self.item_limit = limit;
        self
    }

    /// Identity sent with unauthenticated requests.
    #[must_use]
    pub const fn identity(&self) -> &ClientIdentity {
        &self.identity
    }

    fn anonymous(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(AUTHORIZATION_HEADER, self.identity.authorization_header())
    }

    fn authorized(request: RequestBuilder, session: &Session) -> RequestBuilder {
        request
            .header(
                AUTHORIZATION_HEADER,
                session.identity().authorization_header(),
            )
            .header(TOKEN_HEADER, session.access_token().as_str())
    }

    async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await.map_err(|e| {
            warn!(error = %e, "Request to Jellyfin failed");
            if e.is_timeout() {
                ApiError::network("request timed out")
            } else if e.is_connect() {
                ApiError::unreachable(e.to_string())
            } else {
                ApiError::network(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::handle_error_response(status, response).await)
        }
    }

    async fn handle_error_response(status: StatusCode, response: Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("no reason given")
                .to_string()
        } else {
            body.trim().to_string()
        };
        debug!(status = %status, message = %message, "Jellyfin returned an error status");
        ApiError::status(status.as_u16(), message)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response.json::<T>().await.map_err(|e| {
            warn!(error = %e, "Failed to parse Jellyfin response");
            ApiError::invalid_response(e.to_string())
        })
    }

    /// Runs an `Items` query and maps every item into a domain entity.
    async fn items<T: From<BaseItemDto>>(
        &self,
        session: &Session,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, ApiError> {
        let url = session.server_url().join("Items");
        let mut request = self.client.get(&url).query(query);
        if let Some(limit) = self.item_limit {
            request = request.query(&[("Limit", limit)]);
        }

        let response = Self::send(Self::authorized(request, session)).await?;
        let items: ItemsResponse<BaseItemDto> = Self::parse(response).await?;

        debug!(
            count = items.items.len(),
            total = items.total_record_count,
            "Fetched items"
        );
        Ok(items.items.into_iter().map(T::from).collect())
    }
}

#[async_trait]
impl JellyfinPort for JellyfinClient {
    async fn public_system_info(&self, server_url: &ServerUrl) -> Result<ServerInfo, ApiError> {
        debug!(server = %server_url, "Probing public system info");

        let request = self.anonymous(self.client.get(server_url.join("System/Info/Public")));
        let response = Self::send(request).await.map_err(|e| match e {
            ApiError::UnexpectedStatus { status, message } => {
                ApiError::unreachable(format!("server returned {status}: {message}"))
            }
            other => other,
        })?;
        let info: PublicSystemInfoDto = Self::parse(response).await?;
        Ok(info.into())
    }

    async fn authenticate(
        &self,
        server_url: &ServerUrl,
        username: &str,
        password: &str,
    ) -> Result<Session, ApiError> {
        debug!(server = %server_url, username = %username, "Authenticating");

        let request = self
            .anonymous(self.client.post(server_url.join("Users/AuthenticateByName")))
            .json(&AuthenticateByNameRequest {
                username,
                pw: password,
            });

        let response = Self::send(request).await.map_err(|e| match e {
            ApiError::UnexpectedStatus {
                status: 400 | 401 | 403,
                message,
            } => ApiError::auth_failed(message),
            other => other,
        })?;
        let result: AuthenticationResult = Self::parse(response).await?;

        let token = AccessToken::new(result.access_token)
            .ok_or_else(|| ApiError::invalid_response("server returned an empty access token"))?;

        info!(
            user_id = %result.user.id,
            username = %result.user.name,
            token = %token,
            "Authenticated"
        );

        Ok(Session::new(
            server_url.clone(),
            result.user.id,
            result.user.name,
            token,
            self.identity.clone(),
        ))
    }

    async fn media_libraries(&self, session: &Session) -> Result<Vec<MediaLibrary>, ApiError> {
        let url = session
            .server_url()
            .join(&format!("Users/{}/Views", session.user_id()));
        let response = Self::send(Self::authorized(self.client.get(&url), session)).await?;
        let views: ItemsResponse<BaseItemDto> = Self::parse(response).await?;
        Ok(views.items.into_iter().map(MediaLibrary::from).collect())
    }

    async fn artists(&self, session: &Session, library_id: &str) -> Result<Vec<Artist>, ApiError> {
        self.items(
            session,
            &[
                ("IncludeItemTypes", MUSIC_ARTIST),
                ("ParentId", library_id),
                ("Recursive", "true"),
            ],
        )
        .await
    }

    async fn albums(&self, session: &Session, scope: &AlbumScope) -> Result<Vec<Album>, ApiError> {
        match scope {
            AlbumScope::Library(library_id) => {
                self.items(
                    session,
                    &[
                        ("IncludeItemTypes", MUSIC_ALBUM),
                        ("ParentId", library_id),
                        ("Recursive", "true"),
                    ],
                )
                .await
            }
            AlbumScope::Artist(artist_id) => {
                self.items(
                    session,
                    &[("IncludeItemTypes", MUSIC_ALBUM), ("ParentId", artist_id)],
                )
                .await
            }
        }
    }

    async fn tracks(&self, session: &Session, scope: &TrackScope) -> Result<Vec<Track>, ApiError> {
        match scope {
            TrackScope::Library(library_id) => {
                self.items(
                    session,
                    &[
                        ("IncludeItemTypes", AUDIO),
                        ("ParentId", library_id),
                        ("Recursive", "true"),
                    ],
                )
                .await
            }
            TrackScope::Album(album_id) => {
                self.items(
                    session,
                    &[
                        ("IncludeItemTypes", AUDIO),
                        ("ParentId", album_id),
                        ("SortBy", "IndexNumber"),
                    ],
                )
                .await
            }
            TrackScope::Artist(artist_id) => {
                self.items(
                    session,
                    &[
                        ("IncludeItemTypes", AUDIO),
                        ("ArtistIds", artist_id),
                        ("Recursive", "true"),
                    ],
                )
                .await
            }
        }
    }

    async fn search_tracks(&self, session: &Session, query: &str) -> Result<Vec<Track>, ApiError> {
        self.items(
            session,
            &[
                ("IncludeItemTypes", AUDIO),
                ("Recursive", "true"),
                ("SearchTerm", query),
            ],
        )
        .await
    }

    async fn sessions(&self, session: &Session) -> Result<Vec<RemoteSession>, ApiError> {
        let url = session.server_url().join("Sessions");
        let response = Self::send(Self::authorized(self.client.get(&url), session)).await?;
        let sessions: Vec<SessionInfoDto> = Self::parse(response).await?;
        Ok(sessions.into_iter().map(RemoteSession::from).collect())
    }

    async fn play_on_session(
        &self,
        session: &Session,
        remote_session_id: &str,
        track_id: &str,
    ) -> Result<(), ApiError> {
        debug!(remote_session = %remote_session_id, track_id = %track_id, "Sending play command");

        let url = session
            .server_url()
            .join(&format!("Sessions/{remote_session_id}/Playing"));
        let request = self.client.post(&url).json(&PlayRequest {
            item_ids: vec![track_id],
            play_command: "PlayNow",
        });
        Self::send(Self::authorized(request, session)).await?;
        Ok(())
    }
}
