//! Append-only tombstone tables
//!
//! Audit ids come from the change sequence, not table autoincrement, so
//! they interleave with live-row update ids under one cursor.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UsersAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UsersAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(UsersAudit::UserId).uuid().not_null())
                    .col(ColumnDef::new(UsersAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PartnersAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PartnersAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(PartnersAudit::SharedById).uuid().not_null())
                    .col(ColumnDef::new(PartnersAudit::SharedWithId).uuid().not_null())
                    .col(ColumnDef::new(PartnersAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partners_audit_shared_with_id")
                    .table(PartnersAudit::Table)
                    .col(PartnersAudit::SharedWithId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssetsAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssetsAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(AssetsAudit::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AssetsAudit::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(AssetsAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_audit_owner_id")
                    .table(AssetsAudit::Table)
                    .col(AssetsAudit::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumsAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumsAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(AlbumsAudit::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumsAudit::UserId).uuid().not_null())
                    .col(ColumnDef::new(AlbumsAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_audit_user_id")
                    .table(AlbumsAudit::Table)
                    .col(AlbumsAudit::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumUsersAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumUsersAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(AlbumUsersAudit::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumUsersAudit::UserId).uuid().not_null())
                    .col(ColumnDef::new(AlbumUsersAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_users_audit_user_id")
                    .table(AlbumUsersAudit::Table)
                    .col(AlbumUsersAudit::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumAssetsAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumAssetsAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(AlbumAssetsAudit::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumAssetsAudit::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AlbumAssetsAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_assets_audit_album_id")
                    .table(AlbumAssetsAudit::Table)
                    .col(AlbumAssetsAudit::AlbumId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemoriesAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MemoriesAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(MemoriesAudit::MemoryId).uuid().not_null())
                    .col(ColumnDef::new(MemoriesAudit::UserId).uuid().not_null())
                    .col(ColumnDef::new(MemoriesAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memories_audit_user_id")
                    .table(MemoriesAudit::Table)
                    .col(MemoriesAudit::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemoryAssetsAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MemoryAssetsAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(MemoryAssetsAudit::MemoryId).uuid().not_null())
                    .col(ColumnDef::new(MemoryAssetsAudit::AssetId).uuid().not_null())
                    .col(ColumnDef::new(MemoryAssetsAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memory_assets_audit_memory_id")
                    .table(MemoryAssetsAudit::Table)
                    .col(MemoryAssetsAudit::MemoryId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StacksAudit::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(StacksAudit::Id).big_integer().not_null().primary_key())
                    .col(ColumnDef::new(StacksAudit::StackId).uuid().not_null())
                    .col(ColumnDef::new(StacksAudit::UserId).uuid().not_null())
                    .col(ColumnDef::new(StacksAudit::DeletedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stacks_audit_user_id")
                    .table(StacksAudit::Table)
                    .col(StacksAudit::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StacksAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemoryAssetsAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MemoriesAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AlbumAssetsAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AlbumUsersAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AlbumsAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssetsAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PartnersAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UsersAudit::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UsersAudit {
    Table,
    Id,
    UserId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum PartnersAudit {
    Table,
    Id,
    SharedById,
    SharedWithId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AssetsAudit {
    Table,
    Id,
    AssetId,
    OwnerId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AlbumsAudit {
    Table,
    Id,
    AlbumId,
    UserId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AlbumUsersAudit {
    Table,
    Id,
    AlbumId,
    UserId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum AlbumAssetsAudit {
    Table,
    Id,
    AlbumId,
    AssetId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum MemoriesAudit {
    Table,
    Id,
    MemoryId,
    UserId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum MemoryAssetsAudit {
    Table,
    Id,
    MemoryId,
    AssetId,
    DeletedAt,
}

#[derive(DeriveIden)]
enum StacksAudit {
    Table,
    Id,
    StackId,
    UserId,
    DeletedAt,
}
