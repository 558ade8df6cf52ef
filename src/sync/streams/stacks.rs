//! Stack scans, scoped like assets to owned plus partner timelines.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{audit::stacks_audit, stack};
use crate::sync::streams::partner_sharer_ids;

fn scope(user_id: Uuid) -> Condition {
    Condition::any()
        .add(stack::Column::OwnerId.eq(user_id))
        .add(stack::Column::OwnerId.in_subquery(partner_sharer_ids(user_id)))
}

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<stack::Entity> {
    stack::Entity::find()
        .filter(scope(user_id))
        .filter(stack::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(stack::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(stack::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<stacks_audit::Entity> {
    stacks_audit::Entity::find()
        .filter(
            Condition::any()
                .add(stacks_audit::Column::UserId.eq(user_id))
                .add(stacks_audit::Column::UserId.in_subquery(partner_sharer_ids(user_id))),
        )
        .filter(stacks_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(stacks_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(stacks_audit::Column::Id)
}

pub fn backfill(
    owner_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<stack::Entity> {
    stack::Entity::find()
        .filter(stack::Column::OwnerId.eq(owner_id))
        .filter(stack::Column::UpdateId.gt(after))
        .filter(stack::Column::UpdateId.lte(before))
        .filter(stack::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(stack::Column::UpdateId)
}
