//! Exif scans. Exif rows ride on the asset tombstone, so there is no
//! delete scan.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QueryTrait, Select};
use uuid::Uuid;

use crate::domain::cursor::SyncAck;
use crate::infrastructure::database::entities::{asset, exif};
use crate::sync::streams::{album_member_asset_ids, member_asset_ids, partner_sharer_ids};

fn visible_asset_ids(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column((asset::Entity, asset::Column::Id))
        .from(asset::Entity)
        .cond_where(
            sea_orm::Condition::any()
                .add(Expr::col((asset::Entity, asset::Column::OwnerId)).eq(user_id))
                .add(
                    Expr::col((asset::Entity, asset::Column::OwnerId))
                        .in_subquery(partner_sharer_ids(user_id)),
                )
                .add(
                    Expr::col((asset::Entity, asset::Column::Id))
                        .in_subquery(album_member_asset_ids(user_id)),
                ),
        )
        .to_owned()
}

fn owned_asset_ids(owner_id: Uuid) -> SelectStatement {
    Query::select()
        .column((asset::Entity, asset::Column::Id))
        .from(asset::Entity)
        .and_where(Expr::col((asset::Entity, asset::Column::OwnerId)).eq(owner_id))
        .to_owned()
}

pub fn upserts(
    user_id: Uuid,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<exif::Entity> {
    exif::Entity::find()
        .filter(exif::Column::AssetId.in_subquery(visible_asset_ids(user_id)))
        .filter(exif::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(exif::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(exif::Column::UpdateId)
}

pub fn backfill(
    owner_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<exif::Entity> {
    exif::Entity::find()
        .filter(exif::Column::AssetId.in_subquery(owned_asset_ids(owner_id)))
        .filter(exif::Column::UpdateId.gt(after))
        .filter(exif::Column::UpdateId.lte(before))
        .filter(exif::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(exif::Column::UpdateId)
}

/// Catch-up scan for the members of one newly shared static album.
pub fn album_backfill(
    album_id: Uuid,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<exif::Entity> {
    exif::Entity::find()
        .filter(exif::Column::AssetId.in_subquery(member_asset_ids(album_id)))
        .filter(exif::Column::UpdateId.gt(after))
        .filter(exif::Column::UpdateId.lte(before))
        .filter(exif::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(exif::Column::UpdateId)
}

/// Exif rows for an explicit set of assets. Dynamic-album membership
/// exists only as an evaluation result, so its exif scope is an id
/// list rather than a subquery.
pub fn for_assets(
    asset_ids: Vec<Uuid>,
    ack: Option<SyncAck>,
    settled_before: DateTime<Utc>,
) -> Select<exif::Entity> {
    exif::Entity::find()
        .filter(exif::Column::AssetId.is_in(asset_ids))
        .filter(exif::Column::UpdatedAt.lt(settled_before))
        .apply_if(ack, |q, a| {
            q.filter(exif::Column::UpdateId.gt(a.update_id().value()))
        })
        .order_by_asc(exif::Column::UpdateId)
}

pub fn for_assets_backfill(
    asset_ids: Vec<Uuid>,
    after: i64,
    before: i64,
    settled_before: DateTime<Utc>,
) -> Select<exif::Entity> {
    exif::Entity::find()
        .filter(exif::Column::AssetId.is_in(asset_ids))
        .filter(exif::Column::UpdateId.gt(after))
        .filter(exif::Column::UpdateId.lte(before))
        .filter(exif::Column::UpdatedAt.lt(settled_before))
        .order_by_asc(exif::Column::UpdateId)
}
