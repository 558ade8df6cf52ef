//! Tag hierarchy closure table
//!
//! Every tag is its own ancestor (depth 0 row), so filtering on a tag
//! matches assets tagged anywhere in its subtree with a single join.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tags_closure")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ancestor_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub descendant_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::AncestorId",
        to = "super::tag::Column::Id"
    )]
    Ancestor,
    #[sea_orm(
        belongs_to = "super::tag::Entity",
        from = "Column::DescendantId",
        to = "super::tag::Column::Id"
    )]
    Descendant,
}

impl ActiveModelBehavior for ActiveModel {}
