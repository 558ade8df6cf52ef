//! Wire-facing sync types

use serde::Serialize;
use strum::EnumIter;
use uuid::Uuid;

use crate::domain::cursor::{SyncAck, UpdateId};
use crate::infrastructure::database::entities::{
    album, album_asset, album_user, asset, audit, exif, memory, memory_asset, partner, stack,
    user,
};
use crate::sync::merge::Ordered;

/// Entity types in processing order.
///
/// Declaration order is the dependency order of a sync round: an entity
/// is streamed only after everything it references. Deletes for a type
/// always precede its upserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncEntityType {
    User,
    Partner,
    Asset,
    AssetExif,
    Album,
    AlbumAsset,
    AlbumUser,
    Memory,
    MemoryAsset,
    Stack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SyncOp {
    Upsert,
    Delete,
}

/// One album membership row as the client sees it.
///
/// Static rows come from the join table; dynamic rows are synthesized
/// from the matching asset, carrying the asset's own update id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRow {
    pub album_id: Uuid,
    pub asset_id: Uuid,
    pub update_id: i64,
}

impl From<album_asset::Model> for MembershipRow {
    fn from(row: album_asset::Model) -> Self {
        Self {
            album_id: row.album_id,
            asset_id: row.asset_id,
            update_id: row.update_id,
        }
    }
}

impl Ordered for MembershipRow {
    fn sort_key(&self) -> i64 {
        self.update_id
    }
}

impl Ordered for asset::Model {
    fn sort_key(&self) -> i64 {
        self.update_id
    }
}

impl Ordered for exif::Model {
    fn sort_key(&self) -> i64 {
        self.update_id
    }
}

/// One change in a sync round, paired with the cursor the client may
/// persist after durably applying it.
#[derive(Debug, Clone, Serialize)]
pub struct SyncChange {
    pub ack: SyncAck,
    #[serde(flatten)]
    pub payload: SyncPayload,
}

impl SyncChange {
    pub fn new(change_id: i64, payload: SyncPayload) -> Self {
        Self {
            ack: SyncAck::new(UpdateId::new(change_id)),
            payload,
        }
    }
}

/// The change body. Upserts carry the full row; deletes carry the
/// tombstone.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum SyncPayload {
    UserUpsert(user::Model),
    UserDelete(audit::users_audit::Model),
    PartnerUpsert(partner::Model),
    PartnerDelete(audit::partners_audit::Model),
    AssetUpsert(asset::Model),
    AssetDelete(audit::assets_audit::Model),
    AssetExifUpsert(exif::Model),
    AlbumUpsert(album::Model),
    AlbumDelete(audit::albums_audit::Model),
    AlbumAssetUpsert(MembershipRow),
    AlbumAssetDelete(audit::album_assets_audit::Model),
    AlbumUserUpsert(album_user::Model),
    AlbumUserDelete(audit::album_users_audit::Model),
    MemoryUpsert(memory::Model),
    MemoryDelete(audit::memories_audit::Model),
    MemoryAssetUpsert(memory_asset::Model),
    MemoryAssetDelete(audit::memory_assets_audit::Model),
    StackUpsert(stack::Model),
    StackDelete(audit::stacks_audit::Model),
}

impl SyncPayload {
    pub fn entity_type(&self) -> SyncEntityType {
        match self {
            SyncPayload::UserUpsert(_) | SyncPayload::UserDelete(_) => SyncEntityType::User,
            SyncPayload::PartnerUpsert(_) | SyncPayload::PartnerDelete(_) => {
                SyncEntityType::Partner
            }
            SyncPayload::AssetUpsert(_) | SyncPayload::AssetDelete(_) => SyncEntityType::Asset,
            SyncPayload::AssetExifUpsert(_) => SyncEntityType::AssetExif,
            SyncPayload::AlbumUpsert(_) | SyncPayload::AlbumDelete(_) => SyncEntityType::Album,
            SyncPayload::AlbumAssetUpsert(_) | SyncPayload::AlbumAssetDelete(_) => {
                SyncEntityType::AlbumAsset
            }
            SyncPayload::AlbumUserUpsert(_) | SyncPayload::AlbumUserDelete(_) => {
                SyncEntityType::AlbumUser
            }
            SyncPayload::MemoryUpsert(_) | SyncPayload::MemoryDelete(_) => {
                SyncEntityType::Memory
            }
            SyncPayload::MemoryAssetUpsert(_) | SyncPayload::MemoryAssetDelete(_) => {
                SyncEntityType::MemoryAsset
            }
            SyncPayload::StackUpsert(_) | SyncPayload::StackDelete(_) => SyncEntityType::Stack,
        }
    }

    pub fn op(&self) -> SyncOp {
        match self {
            SyncPayload::UserDelete(_)
            | SyncPayload::PartnerDelete(_)
            | SyncPayload::AssetDelete(_)
            | SyncPayload::AlbumDelete(_)
            | SyncPayload::AlbumAssetDelete(_)
            | SyncPayload::AlbumUserDelete(_)
            | SyncPayload::MemoryDelete(_)
            | SyncPayload::MemoryAssetDelete(_)
            | SyncPayload::StackDelete(_) => SyncOp::Delete,
            _ => SyncOp::Upsert,
        }
    }
}
