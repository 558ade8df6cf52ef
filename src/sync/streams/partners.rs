//! Partner scans, scoped to partnerships the user is on either side of.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{audit::partners_audit, partner};

fn scope(user_id: Uuid) -> Condition {
    Condition::any()
        .add(partner::Column::SharedById.eq(user_id))
        .add(partner::Column::SharedWithId.eq(user_id))
}

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<partner::Entity> {
    partner::Entity::find()
        .filter(scope(user_id))
        .filter(partner::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(partner::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(partner::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<partners_audit::Entity> {
    partners_audit::Entity::find()
        .filter(
            Condition::any()
                .add(partners_audit::Column::SharedById.eq(user_id))
                .add(partners_audit::Column::SharedWithId.eq(user_id)),
        )
        .filter(partners_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(partners_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(partners_audit::Column::Id)
}

/// Partnerships granting this user a new timeline since the watermark.
/// Used to detect sharers whose assets need a backfill.
pub fn created_after(
    user_id: Uuid,
    create_watermark: i64,
    settled_before: DateTime<Utc>,
) -> Select<partner::Entity> {
    partner::Entity::find()
        .filter(partner::Column::SharedWithId.eq(user_id))
        .filter(partner::Column::CreateId.gt(create_watermark))
        .filter(partner::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(partner::Column::CreateId)
}
