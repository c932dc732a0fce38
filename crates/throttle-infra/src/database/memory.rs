//! In-memory client repository - used when no database is configured.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use throttle_core::domain::ClientConfig;
use throttle_core::error::RepoError;
use throttle_core::ports::ClientRepository;

/// Client repository backed by a HashMap.
///
/// Note: Clients are lost on process restart.
#[derive(Default)]
pub struct InMemoryClientRepository {
    clients: RwLock<HashMap<String, ClientConfig>>,
}

impl InMemoryClientRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryClientRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<ClientConfig>, RepoError> {
        Ok(self.clients.read().await.get(name).cloned())
    }

    async fn insert(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        let mut clients = self.clients.write().await;
        if clients.contains_key(&client.name) {
            return Err(RepoError::Constraint(format!(
                "client '{}' already exists",
                client.name
            )));
        }
        clients.insert(client.name.clone(), client.clone());
        Ok(client)
    }

    async fn update(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        let mut clients = self.clients.write().await;
        let existing = clients.get_mut(&client.name).ok_or(RepoError::NotFound)?;
        *existing = client.clone();
        Ok(client)
    }

    async fn delete(&self, name: &str) -> Result<(), RepoError> {
        self.clients
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}
