//! Keyring-based credential storage.

use async_trait::async_trait;
use keyring::Entry;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::domain::entities::UserCredentials;
use crate::domain::errors::SecretError;
use crate::domain::ports::CredentialStoragePort;

const KEYRING_SERVICE: &str = "jambox";
const KEYRING_USER: &str = "credentials";

/// System keyring credential storage adapter.
///
/// Credentials are stored as one JSON document in a single keyring entry.
pub struct KeyringCredentialStorage {
    service: String,
    user: String,
}

impl KeyringCredentialStorage {
    /// Creates new storage with default names.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: KEYRING_SERVICE.to_string(),
            user: KEYRING_USER.to_string(),
        }
    }

    /// Creates storage with custom names.
    #[must_use]
    pub fn with_names(service: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            user: user.into(),
        }
    }

    fn entry(&self) -> Result<Entry, SecretError> {
        Entry::new(&self.service, &self.user)
            .map_err(|e| SecretError::AccessFailed(format!("failed to access keyring: {e}")))
    }
}

impl Default for KeyringCredentialStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStoragePort for KeyringCredentialStorage {
    async fn get_credentials(&self) -> Result<Option<UserCredentials>, SecretError> {
        debug!(service = %self.service, "Retrieving credentials from keyring");

        let entry = self.entry()?;

        match entry.get_password() {
            Ok(secret) => {
                let secret = Zeroizing::new(secret);
                let credentials = serde_json::from_str::<UserCredentials>(&secret).map_err(|e| {
                    warn!(error = %e, "Stored credentials could not be parsed");
                    SecretError::Corrupt(e.to_string())
                })?;
                debug!(server = %credentials.server_url, "Credentials found in keyring");
                Ok(Some(credentials))
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No credentials stored in keyring");
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Failed to retrieve credentials from keyring");
                Err(SecretError::RetrievalFailed(e.to_string()))
            }
        }
    }

    async fn store_credentials(&self, credentials: &UserCredentials) -> Result<(), SecretError> {
        debug!(service = %self.service, "Storing credentials in keyring");

        let secret = Zeroizing::new(
            serde_json::to_string(credentials)
                .map_err(|e| SecretError::StorageFailed(e.to_string()))?,
        );

        self.entry()?.set_password(&secret).map_err(|e| {
            warn!(error = %e, "Failed to store credentials in keyring");
            SecretError::StorageFailed(e.to_string())
        })?;

        debug!("Credentials stored successfully");
        Ok(())
    }

    async fn delete_credentials(&self) -> Result<(), SecretError> {
        debug!(service = %self.service, "Deleting credentials from keyring");

        match self.entry()?.delete_credential() {
            Ok(()) => {
                debug!("Credentials deleted from keyring");
                Ok(())
            }
            Err(keyring::Error::NoEntry) => {
                debug!("No credentials to delete");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to delete credentials from keyring");
                Err(SecretError::DeletionFailed(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    #[ignore = "requires system keyring"]
    async fn test_store_and_retrieve_credentials() {
        let storage = KeyringCredentialStorage::with_names("jambox-test", "test-credentials");
        let credentials = UserCredentials::new("http://jf.local:8096", "alice", "hunter2");

        storage.store_credentials(&credentials).await.unwrap();

        let retrieved = storage.get_credentials().await.unwrap().unwrap();
        assert_eq!(retrieved.username, "alice");
        assert_eq!(retrieved.password(), "hunter2");

        storage.delete_credentials().await.unwrap();
        assert!(!storage.has_credentials().await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires system keyring"]
    async fn test_delete_missing_entry_is_ok() {
        let storage = KeyringCredentialStorage::with_names("jambox-test", "never-stored");
        assert!(storage.delete_credentials().await.is_ok());
    }
}
