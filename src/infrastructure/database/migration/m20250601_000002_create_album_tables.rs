//! Albums, static membership and shares

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Albums::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Albums::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Albums::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Albums::Name).text().not_null())
                    .col(ColumnDef::new(Albums::Description).text().not_null())
                    .col(ColumnDef::new(Albums::ThumbnailAssetId).uuid())
                    .col(ColumnDef::new(Albums::IsActivityEnabled).boolean().not_null())
                    .col(ColumnDef::new(Albums::Order).text().not_null())
                    .col(ColumnDef::new(Albums::Dynamic).boolean().not_null())
                    .col(ColumnDef::new(Albums::Filters).json())
                    .col(ColumnDef::new(Albums::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Albums::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Albums::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_owner_id")
                    .table(Albums::Table)
                    .col(Albums::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_albums_update_id")
                    .table(Albums::Table)
                    .col(Albums::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumAssets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumAssets::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumAssets::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AlbumAssets::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(AlbumAssets::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(AlbumAssets::UpdateId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(AlbumAssets::AlbumId)
                            .col(AlbumAssets::AssetId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_assets_update_id")
                    .table(AlbumAssets::Table)
                    .col(AlbumAssets::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AlbumUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AlbumUsers::AlbumId).uuid().not_null())
                    .col(ColumnDef::new(AlbumUsers::UserId).uuid().not_null())
                    .col(ColumnDef::new(AlbumUsers::Role).text().not_null())
                    .col(ColumnDef::new(AlbumUsers::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(AlbumUsers::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(AlbumUsers::CreateId).big_integer().not_null())
                    .col(ColumnDef::new(AlbumUsers::UpdateId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(AlbumUsers::AlbumId)
                            .col(AlbumUsers::UserId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_users_user_id")
                    .table(AlbumUsers::Table)
                    .col(AlbumUsers::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_users_create_id")
                    .table(AlbumUsers::Table)
                    .col(AlbumUsers::CreateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_album_users_update_id")
                    .table(AlbumUsers::Table)
                    .col(AlbumUsers::UpdateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AlbumUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AlbumAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Albums::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Albums {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    ThumbnailAssetId,
    IsActivityEnabled,
    Order,
    Dynamic,
    Filters,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum AlbumAssets {
    Table,
    AlbumId,
    AssetId,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum AlbumUsers {
    Table,
    AlbumId,
    UserId,
    Role,
    CreatedAt,
    UpdatedAt,
    CreateId,
    UpdateId,
}
