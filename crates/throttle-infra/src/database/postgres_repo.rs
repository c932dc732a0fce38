//! PostgreSQL client repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, DbErr, EntityTrait, QueryFilter, SqlErr};

use throttle_core::domain::ClientConfig;
use throttle_core::error::RepoError;
use throttle_core::ports::ClientRepository;

use super::entity::client::{self, ActiveModel, Entity as ClientEntity};

/// PostgreSQL client repository.
pub struct PostgresClientRepository {
    db: DbConn,
}

impl PostgresClientRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

fn map_db_err(err: DbErr) -> RepoError {
    if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
        return RepoError::Constraint(detail);
    }
    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl ClientRepository for PostgresClientRepository {
    async fn find_by_name(&self, name: &str) -> Result<Option<ClientConfig>, RepoError> {
        tracing::debug!(client = %name, "Finding client by name");

        let result = ClientEntity::find()
            .filter(client::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        result.map(ClientConfig::try_from).transpose()
    }

    async fn insert(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        let active_model = ActiveModel::try_from(client)?;
        let model = ClientEntity::insert(active_model)
            .exec_with_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        ClientConfig::try_from(model)
    }

    async fn update(&self, client: ClientConfig) -> Result<ClientConfig, RepoError> {
        let mut active_model = ActiveModel::try_from(client)?;
        // Creation time is owned by the insert.
        active_model.not_set(client::Column::CreatedAt);

        let model = active_model.update(&self.db).await.map_err(map_db_err)?;
        ClientConfig::try_from(model)
    }

    async fn delete(&self, name: &str) -> Result<(), RepoError> {
        let result = ClientEntity::delete_many()
            .filter(client::Column::Name.eq(name))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }
}
