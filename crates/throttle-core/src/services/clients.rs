//! Client administration.

use std::sync::Arc;

use crate::domain::ClientConfig;
use crate::error::DomainError;
use crate::services::ConfigStore;

/// Register, inspect, update and delete client quotas.
///
/// All writes go through the [`ConfigStore`], so a verification issued after a
/// successful update or delete observes the new state.
pub struct ClientService {
    configs: Arc<ConfigStore>,
}

impl ClientService {
    pub fn new(configs: Arc<ConfigStore>) -> Self {
        Self { configs }
    }

    pub async fn register(
        &self,
        name: &str,
        limit: u64,
        duration: u64,
    ) -> Result<ClientConfig, DomainError> {
        let client = ClientConfig::new(name, limit, duration)?;
        let saved = self.configs.create(client).await?;

        tracing::info!(client = %saved.name, id = %saved.id, limit, duration, "Client registered");
        Ok(saved)
    }

    pub async fn get(&self, name: &str) -> Result<ClientConfig, DomainError> {
        self.configs.get(name).await
    }

    pub async fn update(
        &self,
        name: &str,
        limit: u64,
        duration: u64,
    ) -> Result<ClientConfig, DomainError> {
        ClientConfig::validate(name, limit, duration)?;
        let saved = self.configs.update_quota(name, limit, duration).await?;

        tracing::info!(client = %name, limit, duration, "Client quota updated");
        Ok(saved)
    }

    pub async fn delete(&self, name: &str) -> Result<(), DomainError> {
        self.configs.remove(name).await?;

        tracing::info!(client = %name, "Client deleted");
        Ok(())
    }
}
