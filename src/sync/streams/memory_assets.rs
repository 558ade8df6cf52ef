//! Memory membership scans.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{audit::memory_assets_audit, memory, memory_asset};

fn owned_memory_ids(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column((memory::Entity, memory::Column::Id))
        .from(memory::Entity)
        .and_where(Expr::col((memory::Entity, memory::Column::OwnerId)).eq(user_id))
        .to_owned()
}

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<memory_asset::Entity> {
    memory_asset::Entity::find()
        .filter(memory_asset::Column::MemoryId.in_subquery(owned_memory_ids(user_id)))
        .filter(memory_asset::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(memory_asset::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(memory_asset::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<memory_assets_audit::Entity> {
    memory_assets_audit::Entity::find()
        .filter(memory_assets_audit::Column::MemoryId.in_subquery(owned_memory_ids(user_id)))
        .filter(memory_assets_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(memory_assets_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(memory_assets_audit::Column::Id)
}
