//! Album entity
//!
//! One entity, two modes. A static album's membership lives in the
//! `album_assets` join table. A dynamic album stores a filter expression
//! instead and never has join rows; membership is re-derived from the
//! expression on every query.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "albums")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub thumbnail_asset_id: Option<Uuid>,
    pub is_activity_enabled: bool,
    pub order: AlbumOrder,
    pub dynamic: bool,
    /// Stored filter expression; present iff `dynamic`
    #[sea_orm(column_type = "Json", nullable)]
    pub filters: Option<Json>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[sea_orm(indexed)]
    pub update_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum AlbumOrder {
    #[sea_orm(string_value = "asc")]
    Asc,
    #[sea_orm(string_value = "desc")]
    Desc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::album_asset::Entity")]
    Assets,
    #[sea_orm(has_many = "super::album_user::Entity")]
    SharedUsers,
}

impl Related<super::album_asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assets.def()
    }
}

impl Related<super::album_user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SharedUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
