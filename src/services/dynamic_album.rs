//! Dynamic album lifecycle
//!
//! Create/update validate the filter expression strictly and persist
//! the sanitized form. Deletes and unshares write tombstones in the
//! same transaction as the row removal, drawing their ids from the
//! change sequence so they land in cursor order.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, QueryFilter, TransactionTrait,
};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::domain::filters::{
    sanitize, validate, AlbumFilters, FilterValidationReport,
};
use crate::infrastructure::database::entities::album::AlbumOrder;
use crate::infrastructure::database::entities::{
    album, album_asset, album_user, audit,
};
use crate::infrastructure::database::{next_change_id, Database};

#[derive(Debug, Error)]
pub enum DynamicAlbumError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("invalid filter expression: {0:?}")]
    InvalidFilters(FilterValidationReport),

    #[error("album {0} not found")]
    NotFound(Uuid),
}

pub struct DynamicAlbumService<'a> {
    db: &'a Database,
}

impl<'a> DynamicAlbumService<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Create a dynamic album. The expression is validated strictly;
    /// warnings pass, errors reject.
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        filters: AlbumFilters,
        order: AlbumOrder,
    ) -> Result<album::Model, DynamicAlbumError> {
        let report = validate(&filters);
        if !report.is_valid() {
            return Err(DynamicAlbumError::InvalidFilters(report));
        }
        let filters = sanitize(filters);

        let txn = self.db.conn().begin().await?;
        let update_id = next_change_id(&txn).await?;
        let now = Utc::now();

        let created = album::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(name.to_string()),
            description: Set(String::new()),
            thumbnail_asset_id: Set(None),
            is_activity_enabled: Set(true),
            order: Set(order),
            dynamic: Set(true),
            filters: Set(Some(serde_json::to_value(&filters).map_err(|e| {
                DbErr::Custom(format!("failed to encode filters: {e}"))
            })?)),
            created_at: Set(now),
            updated_at: Set(now),
            update_id: Set(update_id),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(album_id = %created.id, owner = %owner_id, "created dynamic album");
        Ok(created)
    }

    pub async fn get(&self, album_id: Uuid) -> Result<album::Model, DynamicAlbumError> {
        album::Entity::find_by_id(album_id)
            .one(self.db.conn())
            .await?
            .ok_or(DynamicAlbumError::NotFound(album_id))
    }

    /// The album's filter expression, sanitized on the way out. Empty
    /// for static albums and unreadable blobs.
    pub fn filters_of(album: &album::Model) -> AlbumFilters {
        album
            .filters
            .as_ref()
            .map(AlbumFilters::from_stored)
            .unwrap_or_default()
    }

    /// Replace the filter expression, bumping the album's update id so
    /// clients re-fetch it and re-derive membership.
    pub async fn update_filters(
        &self,
        album_id: Uuid,
        filters: AlbumFilters,
    ) -> Result<album::Model, DynamicAlbumError> {
        let report = validate(&filters);
        if !report.is_valid() {
            return Err(DynamicAlbumError::InvalidFilters(report));
        }
        let filters = sanitize(filters);

        let existing = self.get(album_id).await?;

        let txn = self.db.conn().begin().await?;
        let update_id = next_change_id(&txn).await?;

        let mut active: album::ActiveModel = existing.into();
        active.filters = Set(Some(serde_json::to_value(&filters).map_err(|e| {
            DbErr::Custom(format!("failed to encode filters: {e}"))
        })?));
        active.updated_at = Set(Utc::now());
        active.update_id = Set(update_id);
        let updated = active.update(&txn).await?;
        txn.commit().await?;

        Ok(updated)
    }

    /// Delete an album, writing one tombstone per user it was visible
    /// to, so shared viewers converge as well as the owner.
    pub async fn delete(&self, album_id: Uuid) -> Result<(), DynamicAlbumError> {
        let existing = self.get(album_id).await?;

        let txn = self.db.conn().begin().await?;
        let now = Utc::now();

        let shares = album_user::Entity::find()
            .filter(album_user::Column::AlbumId.eq(album_id))
            .all(&txn)
            .await?;

        let mut visible_to: Vec<Uuid> = vec![existing.owner_id];
        visible_to.extend(shares.iter().map(|s| s.user_id));

        for user_id in visible_to {
            let id = next_change_id(&txn).await?;
            audit::albums_audit::ActiveModel {
                id: Set(id),
                album_id: Set(album_id),
                user_id: Set(user_id),
                deleted_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        album_asset::Entity::delete_many()
            .filter(album_asset::Column::AlbumId.eq(album_id))
            .exec(&txn)
            .await?;
        album_user::Entity::delete_many()
            .filter(album_user::Column::AlbumId.eq(album_id))
            .exec(&txn)
            .await?;
        album::Entity::delete_by_id(album_id).exec(&txn).await?;

        txn.commit().await?;
        info!(album_id = %album_id, "deleted album");
        Ok(())
    }

    /// Share an album with a user. The share's create id marks when the
    /// album became visible to them, which drives backfill detection.
    pub async fn share(
        &self,
        album_id: Uuid,
        user_id: Uuid,
        role: album_user::AlbumUserRole,
    ) -> Result<album_user::Model, DynamicAlbumError> {
        // Ensure the album exists first.
        self.get(album_id).await?;

        let txn = self.db.conn().begin().await?;
        let id = next_change_id(&txn).await?;
        let now = Utc::now();

        let share = album_user::ActiveModel {
            album_id: Set(album_id),
            user_id: Set(user_id),
            role: Set(role),
            created_at: Set(now),
            updated_at: Set(now),
            create_id: Set(id),
            update_id: Set(id),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        Ok(share)
    }

    pub async fn unshare(
        &self,
        album_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), DynamicAlbumError> {
        let txn = self.db.conn().begin().await?;
        let id = next_change_id(&txn).await?;

        audit::album_users_audit::ActiveModel {
            id: Set(id),
            album_id: Set(album_id),
            user_id: Set(user_id),
            deleted_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        album_user::Entity::delete_by_id((album_id, user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;
        Ok(())
    }
}
