//! Album share scans.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{album_user, audit::album_users_audit};
use crate::sync::streams::visible_album_ids;

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<album_user::Entity> {
    album_user::Entity::find()
        .filter(album_user::Column::AlbumId.in_subquery(visible_album_ids(user_id, None)))
        .filter(album_user::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(album_user::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(album_user::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<album_users_audit::Entity> {
    // The removed user still sees the tombstone for an album that is no
    // longer visible to them.
    album_users_audit::Entity::find()
        .filter(
            Condition::any()
                .add(album_users_audit::Column::UserId.eq(user_id))
                .add(
                    album_users_audit::Column::AlbumId
                        .in_subquery(visible_album_ids(user_id, None)),
                ),
        )
        .filter(album_users_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(album_users_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(album_users_audit::Column::Id)
}

/// Shares granting this user a new album since the watermark. Used to
/// detect albums whose contents need a backfill.
pub fn created_after(
    user_id: Uuid,
    create_watermark: i64,
    settled_before: DateTime<Utc>,
) -> Select<album_user::Entity> {
    album_user::Entity::find()
        .filter(album_user::Column::UserId.eq(user_id))
        .filter(album_user::Column::CreateId.gt(create_watermark))
        .filter(album_user::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(album_user::Column::CreateId)
}

pub fn backfill(
    album_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<album_user::Entity> {
    album_user::Entity::find()
        .filter(album_user::Column::AlbumId.eq(album_id))
        .filter(album_user::Column::UpdateId.gt(after))
        .filter(album_user::Column::UpdateId.lte(before))
        .filter(album_user::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(album_user::Column::UpdateId)
}
