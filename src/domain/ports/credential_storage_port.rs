//! Credential storage port definition.

use async_trait::async_trait;

use crate::domain::entities::UserCredentials;
use crate::domain::errors::SecretError;

/// Port for persisting login credentials between runs.
#[async_trait]
pub trait CredentialStoragePort: Send + Sync {
    /// Retrieves stored credentials.
    async fn get_credentials(&self) -> Result<Option<UserCredentials>, SecretError>;

    /// Stores credentials securely.
    async fn store_credentials(&self, credentials: &UserCredentials) -> Result<(), SecretError>;

    /// Deletes stored credentials.
    async fn delete_credentials(&self) -> Result<(), SecretError>;

    /// Checks if credentials exist.
    async fn has_credentials(&self) -> Result<bool, SecretError> {
        Ok(self.get_credentials().await?.is_some())
    }
}

/// In-memory credential storage for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory credential storage for testing.
    pub struct MockCredentialStorage {
        credentials: Arc<RwLock<Option<UserCredentials>>>,
    }

    impl MockCredentialStorage {
        /// Creates empty mock storage.
        pub fn new() -> Self {
            Self {
                credentials: Arc::new(RwLock::new(None)),
            }
        }

        /// Creates mock storage holding credentials.
        pub fn with_credentials(credentials: UserCredentials) -> Self {
            Self {
                credentials: Arc::new(RwLock::new(Some(credentials))),
            }
        }
    }

    impl Default for MockCredentialStorage {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl CredentialStoragePort for MockCredentialStorage {
        async fn get_credentials(&self) -> Result<Option<UserCredentials>, SecretError> {
            Ok(self.credentials.read().await.clone())
        }

        async fn store_credentials(&self, credentials: &UserCredentials) -> Result<(), SecretError> {
            *self.credentials.write().await = Some(credentials.clone());
            Ok(())
        }

        async fn delete_credentials(&self) -> Result<(), SecretError> {
            *self.credentials.write().await = None;
            Ok(())
        }
    }
}
