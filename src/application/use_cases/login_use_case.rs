//! Login use case implementation.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::dto::{LoginRequest, LoginResponse};
use crate::domain::entities::ServerUrl;
use crate::domain::errors::ApiError;
use crate::domain::ports::{CredentialStoragePort, ImageCachePort, JellyfinPort};

/// Handles the login, resume and logout workflows.
#[derive(Clone)]
pub struct LoginUseCase {
    jellyfin: Arc<dyn JellyfinPort>,
    storage_port: Arc<dyn CredentialStoragePort>,
}

impl LoginUseCase {
    /// Creates new login use case.
    #[must_use]
    pub const fn new(
        jellyfin: Arc<dyn JellyfinPort>,
        storage_port: Arc<dyn CredentialStoragePort>,
    ) -> Self {
        Self {
            jellyfin,
            storage_port,
        }
    }

    /// Executes login with provided request.
    ///
    /// # Errors
    /// Returns error if the URL is invalid, the server cannot be reached or
    /// the credentials are rejected.
    pub async fn execute(&self, request: LoginRequest) -> Result<LoginResponse, ApiError> {
        let credentials = &request.credentials;
        debug!(source = %request.source, server = %credentials.server_url, "Attempting login");

        let server_url = ServerUrl::parse(&credentials.server_url).ok_or_else(|| {
            warn!(server = %credentials.server_url, "Invalid server URL");
            ApiError::invalid_url(credentials.server_url.clone())
        })?;

        if credentials.username.trim().is_empty() {
            return Err(ApiError::auth_failed("user name is required"));
        }

        let server_info = self
            .jellyfin
            .public_system_info(&server_url)
            .await
            .map_err(|e| {
                warn!(error = %e, "Server probe failed");
                match e {
                    ApiError::ServerUnreachable { .. } => e,
                    other => ApiError::unreachable(other.to_string()),
                }
            })?;

        debug!(server = %server_info, "Server reachable, authenticating");

        let session = self
            .jellyfin
            .authenticate(&server_url, credentials.username.trim(), credentials.password())
            .await
            .map_err(|e| {
                warn!(error = %e, "Authentication failed");
                e
            })?;

        info!(
            user_id = %session.user_id(),
            username = %session.user_name(),
            server = %server_info,
            "Successfully authenticated"
        );

        let credentials_persisted = if request.persist_credentials {
            match self.storage_port.store_credentials(credentials).await {
                Ok(()) => {
                    info!("Credentials persisted to secure storage");
                    true
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to persist credentials to secure storage");
                    false
                }
            }
        } else {
            debug!("Credential persistence disabled, skipping storage");
            false
        };

        Ok(LoginResponse {
            session,
            server_info,
            source: request.source,
            credentials_persisted,
        })
    }

    /// Logs in again with the stored credentials.
    ///
    /// # Errors
    /// Returns [`ApiError::NotAuthenticated`] when nothing is stored, or any
    /// error from [`Self::execute`].
    pub async fn resume(&self) -> Result<LoginResponse, ApiError> {
        let credentials = self
            .storage_port
            .get_credentials()
            .await?
            .ok_or(ApiError::NotAuthenticated)?;

        debug!(username = %credentials.username, "Resuming with stored credentials");
        self.execute(LoginRequest::from(credentials)).await
    }

    /// Forgets stored credentials and releases every cached image.
    ///
    /// # Errors
    /// Returns error if the credentials cannot be deleted. The cache is
    /// cleared either way.
    pub async fn logout(&self, image_cache: &dyn ImageCachePort) -> Result<(), ApiError> {
        debug!("Logging out");
        image_cache.clear();

        match self.storage_port.delete_credentials().await {
            Ok(()) => {
                info!("Credentials deleted from secure storage");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to delete credentials from secure storage");
                Err(e.into())
            }
        }
    }
}
