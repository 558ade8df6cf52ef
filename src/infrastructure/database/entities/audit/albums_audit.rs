use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A row per user the deleted album was visible to, so shared viewers
/// receive the tombstone as well as the owner.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "albums_audit")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub album_id: Uuid,
    #[sea_orm(indexed)]
    pub user_id: Uuid,
    pub deleted_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
