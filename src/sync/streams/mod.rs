//! Per-entity sync scans
//!
//! Each module builds the scoped, cursor-filtered, settle-windowed
//! queries for one entity type. Builders return `Select` values so the
//! session can stream them lazily and tests can inspect the generated
//! SQL.
//!
//! Every upsert scan follows the same shape: scope to what the caller
//! may see, exclude rows mutated after `settled_before`, resume
//! strictly after the acknowledged cursor, and order ascending by
//! update id. Delete scans do the same over the audit tables.

use sea_orm::sea_query::{Expr, Query, SelectStatement};
use uuid::Uuid;

use crate::infrastructure::database::entities::{album, album_asset, album_user, partner};

pub mod album_assets;
pub mod album_users;
pub mod albums;
pub mod asset_exif;
pub mod assets;
pub mod memories;
pub mod memory_assets;
pub mod partners;
pub mod stacks;
pub mod users;

/// Albums visible to a user: owned plus shared with them. Optionally
/// restricted to dynamic or static albums.
pub(crate) fn visible_album_ids(user_id: Uuid, dynamic: Option<bool>) -> SelectStatement {
    let mut select = Query::select();
    select
        .column((album::Entity, album::Column::Id))
        .from(album::Entity)
        .cond_where(
            sea_orm::Condition::any()
                .add(Expr::col((album::Entity, album::Column::OwnerId)).eq(user_id))
                .add(
                    Expr::col((album::Entity, album::Column::Id)).in_subquery(
                        Query::select()
                            .column((album_user::Entity, album_user::Column::AlbumId))
                            .from(album_user::Entity)
                            .and_where(
                                Expr::col((album_user::Entity, album_user::Column::UserId))
                                    .eq(user_id),
                            )
                            .to_owned(),
                    ),
                ),
        );
    if let Some(dynamic) = dynamic {
        select.and_where(Expr::col((album::Entity, album::Column::Dynamic)).eq(dynamic));
    }
    select.to_owned()
}

/// Assets that are members of any static album visible to the user.
/// Dynamic albums have no join rows; their members are computed and
/// interleaved by the session.
pub(crate) fn album_member_asset_ids(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column((album_asset::Entity, album_asset::Column::AssetId))
        .from(album_asset::Entity)
        .and_where(
            Expr::col((album_asset::Entity, album_asset::Column::AlbumId))
                .in_subquery(visible_album_ids(user_id, Some(false))),
        )
        .to_owned()
}

/// Members of one static album.
pub(crate) fn member_asset_ids(album_id: Uuid) -> SelectStatement {
    Query::select()
        .column((album_asset::Entity, album_asset::Column::AssetId))
        .from(album_asset::Entity)
        .and_where(
            Expr::col((album_asset::Entity, album_asset::Column::AlbumId)).eq(album_id),
        )
        .to_owned()
}

/// Users whose timelines are shared with this user.
pub(crate) fn partner_sharer_ids(user_id: Uuid) -> SelectStatement {
    Query::select()
        .column((partner::Entity, partner::Column::SharedById))
        .from(partner::Entity)
        .and_where(Expr::col((partner::Entity, partner::Column::SharedWithId)).eq(user_id))
        .to_owned()
}
