//! User scans. Every user in the library is visible to every client.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{audit::users_audit, user};

pub fn upserts(
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<user::Entity> {
    user::Entity::find()
        .filter(user::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(user::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(user::Column::UpdateId)
}

pub fn deletes(
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<users_audit::Entity> {
    users_audit::Entity::find()
        .filter(users_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(users_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(users_audit::Column::Id)
}
