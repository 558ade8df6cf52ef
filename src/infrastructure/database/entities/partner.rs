//! Partner sharing entity
//!
//! A row means `shared_by` exposes their timeline to `shared_with`.
//! `create_id` is stamped once at insert and is how the sync session
//! detects a partnership the client has never seen.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub shared_by_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub shared_with_id: Uuid,
    pub in_timeline: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    #[sea_orm(indexed)]
    pub create_id: i64,
    #[sea_orm(indexed)]
    pub update_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SharedById",
        to = "super::user::Column::Id"
    )]
    SharedBy,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::SharedWithId",
        to = "super::user::Column::Id"
    )]
    SharedWith,
}

impl ActiveModelBehavior for ActiveModel {}
