//! Memory scans. Memories are personal, never shared.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{audit::memories_audit, memory};

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<memory::Entity> {
    memory::Entity::find()
        .filter(memory::Column::OwnerId.eq(user_id))
        .filter(memory::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(memory::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(memory::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<memories_audit::Entity> {
    memories_audit::Entity::find()
        .filter(memories_audit::Column::UserId.eq(user_id))
        .filter(memories_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(memories_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(memories_audit::Column::Id)
}
