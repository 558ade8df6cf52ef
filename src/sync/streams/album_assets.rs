//! Static album membership scans.
//!
//! Only static albums have join-table rows; dynamic membership is
//! synthesized separately and merged in by the session.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{album_asset, audit::album_assets_audit};
use crate::sync::streams::visible_album_ids;

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<album_asset::Entity> {
    album_asset::Entity::find()
        .filter(album_asset::Column::AlbumId.in_subquery(visible_album_ids(user_id, None)))
        .filter(album_asset::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(album_asset::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(album_asset::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<album_assets_audit::Entity> {
    album_assets_audit::Entity::find()
        .filter(
            album_assets_audit::Column::AlbumId.in_subquery(visible_album_ids(user_id, None)),
        )
        .filter(album_assets_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(album_assets_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(album_assets_audit::Column::Id)
}

pub fn backfill(
    album_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<album_asset::Entity> {
    album_asset::Entity::find()
        .filter(album_asset::Column::AlbumId.eq(album_id))
        .filter(album_asset::Column::UpdateId.gt(after))
        .filter(album_asset::Column::UpdateId.lte(before))
        .filter(album_asset::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(album_asset::Column::UpdateId)
}
