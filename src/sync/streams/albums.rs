//! Album scans, scoped to owned plus shared albums.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{album, audit::albums_audit};
use crate::sync::streams::visible_album_ids;

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<album::Entity> {
    album::Entity::find()
        .filter(album::Column::Id.in_subquery(visible_album_ids(user_id, None)))
        .filter(album::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(album::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(album::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<albums_audit::Entity> {
    // Album tombstones are fanned out per visible user at delete time.
    albums_audit::Entity::find()
        .filter(albums_audit::Column::UserId.eq(user_id))
        .filter(albums_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(albums_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(albums_audit::Column::Id)
}
