use async_trait::async_trait;

use crate::domain::ClientConfig;
use crate::error::RepoError;

/// Persistent store for client configuration, keyed by the unique client name.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Find a client by its name.
    async fn find_by_name(&self, name: &str) -> Result<Option<ClientConfig>, RepoError>;

    /// Insert a new client. Fails with [`RepoError::Constraint`] when the name is taken.
    async fn insert(&self, client: ClientConfig) -> Result<ClientConfig, RepoError>;

    /// Overwrite an existing client. Fails with [`RepoError::NotFound`] when absent.
    async fn update(&self, client: ClientConfig) -> Result<ClientConfig, RepoError>;

    /// Delete a client by name. Fails with [`RepoError::NotFound`] when absent.
    async fn delete(&self, name: &str) -> Result<(), RepoError>;
}
