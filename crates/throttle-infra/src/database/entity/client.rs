//! Client entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use throttle_core::domain::ClientConfig;
use throttle_core::error::RepoError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub request_limit: i64,
    pub duration_secs: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn to_column(field: &str, value: u64) -> Result<i64, RepoError> {
    i64::try_from(value)
        .map_err(|_| RepoError::Query(format!("{field} {value} does not fit the column")))
}

fn from_column(field: &str, value: i64) -> Result<u64, RepoError> {
    u64::try_from(value)
        .map_err(|_| RepoError::Query(format!("stored {field} {value} is negative")))
}

/// Conversion from SeaORM Model to Domain ClientConfig.
impl TryFrom<Model> for ClientConfig {
    type Error = RepoError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            name: model.name,
            limit: from_column("request_limit", model.request_limit)?,
            duration: from_column("duration_secs", model.duration_secs)?,
            created_at: model.created_at.into(),
            updated_at: model.updated_at.into(),
        })
    }
}

/// Conversion from Domain ClientConfig to SeaORM ActiveModel.
impl TryFrom<ClientConfig> for ActiveModel {
    type Error = RepoError;

    fn try_from(client: ClientConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Set(client.id),
            request_limit: Set(to_column("limit", client.limit)?),
            duration_secs: Set(to_column("duration", client.duration)?),
            name: Set(client.name),
            created_at: Set(client.created_at.into()),
            updated_at: Set(client.updated_at.into()),
        })
    }
}
