//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Once;

use chrono::{DateTime, Duration, Utc};
use futures::{Stream, TryStreamExt};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait};
use uuid::Uuid;

use aperture_sync::config::SyncConfig;
use aperture_sync::infrastructure::database::entities::{
    album, album_asset, album_user, asset, asset_face, audit, exif, memory, memory_asset,
    partner, stack, tag, tag_asset, tag_closure, user,
};
use aperture_sync::infrastructure::database::{next_change_id, Database};
use aperture_sync::sync::{SyncChange, SyncError, SyncService};

static TRACING: Once = Once::new();

pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

pub async fn test_db() -> Database {
    init_tracing();
    let db = Database::in_memory().await.expect("in-memory database");
    db.migrate().await.expect("migrations");
    db
}

/// Service with no settle window, so freshly written rows are visible
/// to the next round. Settle-specific tests configure their own window.
pub async fn test_service() -> SyncService {
    let db = test_db().await;
    let config = SyncConfig {
        settle_window_ms: 0,
        ..SyncConfig::default()
    };
    SyncService::new(db, config)
}

/// Timestamp safely older than any realistic settle window.
pub fn settled() -> DateTime<Utc> {
    Utc::now() - Duration::seconds(5)
}

pub async fn drain(
    stream: impl Stream<Item = Result<SyncChange, SyncError>>,
) -> Vec<SyncChange> {
    futures::pin_mut!(stream);
    let mut out = Vec::new();
    while let Some(change) = stream.try_next().await.expect("sync round") {
        out.push(change);
    }
    out
}

pub async fn seed_user(db: &Database, name: &str) -> user::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(format!("{name}@example.com")),
        deleted_at: Set(None),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub struct AssetSeed {
    pub owner_id: Uuid,
    pub kind: asset::AssetKind,
    pub visibility: asset::AssetVisibility,
    pub is_favorite: bool,
    pub file_created_at: DateTime<Utc>,
}

impl AssetSeed {
    pub fn new(owner_id: Uuid) -> Self {
        Self {
            owner_id,
            kind: asset::AssetKind::Image,
            visibility: asset::AssetVisibility::Timeline,
            is_favorite: false,
            file_created_at: settled(),
        }
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn video(mut self) -> Self {
        self.kind = asset::AssetKind::Video;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.visibility = asset::AssetVisibility::Hidden;
        self
    }

    pub fn taken_at(mut self, at: DateTime<Utc>) -> Self {
        self.file_created_at = at;
        self
    }

    pub async fn insert(self, db: &Database) -> asset::Model {
        let id = next_change_id(db.conn()).await.unwrap();
        asset::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(self.owner_id),
            original_file_name: Set(format!("img-{id}.jpg")),
            kind: Set(self.kind),
            visibility: Set(self.visibility),
            is_favorite: Set(self.is_favorite),
            file_created_at: Set(self.file_created_at),
            deleted_at: Set(None),
            created_at: Set(settled()),
            updated_at: Set(settled()),
            update_id: Set(id),
        }
        .insert(db.conn())
        .await
        .unwrap()
    }
}

pub async fn seed_asset(db: &Database, owner_id: Uuid) -> asset::Model {
    AssetSeed::new(owner_id).insert(db).await
}

/// Touch an asset with a just-now timestamp, as an in-flight write
/// inside the settle window would look.
pub async fn refresh_asset(db: &Database, asset_id: Uuid) -> asset::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    let existing = asset::Entity::find_by_id(asset_id)
        .one(db.conn())
        .await
        .unwrap()
        .unwrap();
    let mut active: asset::ActiveModel = existing.into();
    active.updated_at = Set(Utc::now());
    active.update_id = Set(id);
    active.update(db.conn()).await.unwrap()
}

/// Touch an asset: bump its update id as a real edit would.
pub async fn touch_asset(db: &Database, asset_id: Uuid) -> asset::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    let existing = asset::Entity::find_by_id(asset_id)
        .one(db.conn())
        .await
        .unwrap()
        .unwrap();
    let mut active: asset::ActiveModel = existing.into();
    active.updated_at = Set(settled());
    active.update_id = Set(id);
    active.update(db.conn()).await.unwrap()
}

pub async fn seed_exif(
    db: &Database,
    asset_id: Uuid,
    city: Option<&str>,
    make: Option<&str>,
    rating: Option<i32>,
) -> exif::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    exif::ActiveModel {
        asset_id: Set(asset_id),
        city: Set(city.map(String::from)),
        state: Set(None),
        country: Set(None),
        make: Set(make.map(String::from)),
        model: Set(None),
        lens_model: Set(None),
        rating: Set(rating),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

/// Touch an exif row: bump its update id as a metadata edit would.
pub async fn touch_exif(db: &Database, asset_id: Uuid) -> exif::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    let existing = exif::Entity::find_by_id(asset_id)
        .one(db.conn())
        .await
        .unwrap()
        .unwrap();
    let mut active: exif::ActiveModel = existing.into();
    active.updated_at = Set(settled());
    active.update_id = Set(id);
    active.update(db.conn()).await.unwrap()
}

/// Insert a tag and its closure rows (self plus inherited ancestors).
pub async fn seed_tag(db: &Database, value: &str, parent: Option<&tag::Model>) -> tag::Model {
    let created = tag::ActiveModel {
        id: Set(Uuid::new_v4()),
        value: Set(value.to_string()),
        parent_id: Set(parent.map(|p| p.id)),
        created_at: Set(settled()),
        updated_at: Set(settled()),
    }
    .insert(db.conn())
    .await
    .unwrap();

    tag_closure::ActiveModel {
        ancestor_id: Set(created.id),
        descendant_id: Set(created.id),
    }
    .insert(db.conn())
    .await
    .unwrap();

    if let Some(parent) = parent {
        let ancestors = tag_closure::Entity::find()
            .filter(tag_closure::Column::DescendantId.eq(parent.id))
            .all(db.conn())
            .await
            .unwrap();
        for row in ancestors {
            tag_closure::ActiveModel {
                ancestor_id: Set(row.ancestor_id),
                descendant_id: Set(created.id),
            }
            .insert(db.conn())
            .await
            .unwrap();
        }
    }

    created
}

pub async fn attach_tag(db: &Database, tag_id: Uuid, asset_id: Uuid) {
    tag_asset::ActiveModel {
        tag_id: Set(tag_id),
        asset_id: Set(asset_id),
    }
    .insert(db.conn())
    .await
    .unwrap();
}

pub async fn seed_face(db: &Database, asset_id: Uuid, person_id: Uuid) {
    asset_face::ActiveModel {
        id: Set(Uuid::new_v4()),
        asset_id: Set(asset_id),
        person_id: Set(Some(person_id)),
    }
    .insert(db.conn())
    .await
    .unwrap();
}

pub async fn seed_album(db: &Database, owner_id: Uuid, name: &str) -> album::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    album::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        name: Set(name.to_string()),
        description: Set(String::new()),
        thumbnail_asset_id: Set(None),
        is_activity_enabled: Set(true),
        order: Set(album::AlbumOrder::Desc),
        dynamic: Set(false),
        filters: Set(None),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_album_asset(
    db: &Database,
    album_id: Uuid,
    asset_id: Uuid,
) -> album_asset::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    album_asset::ActiveModel {
        album_id: Set(album_id),
        asset_id: Set(asset_id),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_share(db: &Database, album_id: Uuid, user_id: Uuid) -> album_user::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    album_user::ActiveModel {
        album_id: Set(album_id),
        user_id: Set(user_id),
        role: Set(album_user::AlbumUserRole::Viewer),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        create_id: Set(id),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_partner(db: &Database, shared_by: Uuid, shared_with: Uuid) -> partner::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    partner::ActiveModel {
        shared_by_id: Set(shared_by),
        shared_with_id: Set(shared_with),
        in_timeline: Set(true),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        create_id: Set(id),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_memory(db: &Database, owner_id: Uuid) -> memory::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    memory::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        memory_type: Set("on_this_day".to_string()),
        data: Set(serde_json::json!({ "year": 2021 })),
        is_saved: Set(false),
        memory_at: Set(settled()),
        seen_at: Set(None),
        show_at: Set(None),
        hide_at: Set(None),
        deleted_at: Set(None),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_memory_asset(
    db: &Database,
    memory_id: Uuid,
    asset_id: Uuid,
) -> memory_asset::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    memory_asset::ActiveModel {
        memory_id: Set(memory_id),
        asset_id: Set(asset_id),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

pub async fn seed_stack(db: &Database, owner_id: Uuid, primary_asset_id: Uuid) -> stack::Model {
    let id = next_change_id(db.conn()).await.unwrap();
    stack::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(owner_id),
        primary_asset_id: Set(primary_asset_id),
        created_at: Set(settled()),
        updated_at: Set(settled()),
        update_id: Set(id),
    }
    .insert(db.conn())
    .await
    .unwrap()
}

/// Hard-delete an asset, writing its tombstone in the same transaction.
pub async fn delete_asset(db: &Database, asset: &asset::Model) -> i64 {
    let txn = db.conn().begin().await.unwrap();
    let id = next_change_id(&txn).await.unwrap();
    audit::assets_audit::ActiveModel {
        id: Set(id),
        asset_id: Set(asset.id),
        owner_id: Set(asset.owner_id),
        deleted_at: Set(settled()),
    }
    .insert(&txn)
    .await
    .unwrap();
    exif::Entity::delete_by_id(asset.id).exec(&txn).await.unwrap();
    asset::Entity::delete_by_id(asset.id).exec(&txn).await.unwrap();
    txn.commit().await.unwrap();
    id
}

/// Remove a static membership row, writing its tombstone.
pub async fn remove_album_asset(db: &Database, album_id: Uuid, asset_id: Uuid) -> i64 {
    let txn = db.conn().begin().await.unwrap();
    let id = next_change_id(&txn).await.unwrap();
    audit::album_assets_audit::ActiveModel {
        id: Set(id),
        album_id: Set(album_id),
        asset_id: Set(asset_id),
        deleted_at: Set(settled()),
    }
    .insert(&txn)
    .await
    .unwrap();
    album_asset::Entity::delete_by_id((album_id, asset_id))
        .exec(&txn)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    id
}

/// Remove a partnership, writing its tombstone.
pub async fn remove_partner(db: &Database, shared_by: Uuid, shared_with: Uuid) -> i64 {
    let txn = db.conn().begin().await.unwrap();
    let id = next_change_id(&txn).await.unwrap();
    audit::partners_audit::ActiveModel {
        id: Set(id),
        shared_by_id: Set(shared_by),
        shared_with_id: Set(shared_with),
        deleted_at: Set(settled()),
    }
    .insert(&txn)
    .await
    .unwrap();
    partner::Entity::delete_by_id((shared_by, shared_with))
        .exec(&txn)
        .await
        .unwrap();
    txn.commit().await.unwrap();
    id
}
