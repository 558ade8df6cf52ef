//! Asset scans, scoped to owned assets, partner timelines and members
//! of visible albums.

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select,
};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{asset, audit::assets_audit};
use crate::sync::streams::{album_member_asset_ids, member_asset_ids, partner_sharer_ids};

/// Everything the user may fetch: own assets, partner timelines, and
/// members of static albums shared with them. Dynamic-album members are
/// computed runs interleaved by the session.
pub(crate) fn visible_scope(user_id: Uuid) -> Condition {
    Condition::any()
        .add(asset::Column::OwnerId.eq(user_id))
        .add(asset::Column::OwnerId.in_subquery(partner_sharer_ids(user_id)))
        .add(asset::Column::Id.in_subquery(album_member_asset_ids(user_id)))
}

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<asset::Entity> {
    asset::Entity::find()
        .filter(visible_scope(user_id))
        .filter(asset::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(asset::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(asset::Column::UpdateId)
}

pub fn deletes(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<assets_audit::Entity> {
    assets_audit::Entity::find()
        .filter(
            Condition::any()
                .add(assets_audit::Column::OwnerId.eq(user_id))
                .add(assets_audit::Column::OwnerId.in_subquery(partner_sharer_ids(user_id))),
        )
        .filter(assets_audit::Column::DeletedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(assets_audit::Column::Id.gt(a.update_id().value()))
        })
        .order_by_asc(assets_audit::Column::Id)
}

/// Catch-up scan for one newly visible owner: `(after, before]` by
/// update id, still honoring the settle window.
pub fn backfill(
    owner_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<asset::Entity> {
    asset::Entity::find()
        .filter(asset::Column::OwnerId.eq(owner_id))
        .filter(asset::Column::UpdateId.gt(after))
        .filter(asset::Column::UpdateId.lte(before))
        .filter(asset::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(asset::Column::UpdateId)
}

/// Catch-up scan for the members of one newly shared static album.
pub fn album_backfill(
    album_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<asset::Entity> {
    asset::Entity::find()
        .filter(asset::Column::Id.in_subquery(member_asset_ids(album_id)))
        .filter(asset::Column::UpdateId.gt(after))
        .filter(asset::Column::UpdateId.lte(before))
        .filter(asset::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(asset::Column::UpdateId)
}
