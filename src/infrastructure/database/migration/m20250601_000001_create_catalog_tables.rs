//! Users, partners, assets, exif, stacks, memories and memory membership

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Name).text().not_null())
                    .col(ColumnDef::new(Users::Email).text().not_null().unique_key())
                    .col(ColumnDef::new(Users::DeletedAt).timestamp())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_update_id")
                    .table(Users::Table)
                    .col(Users::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Partners::SharedById).uuid().not_null())
                    .col(ColumnDef::new(Partners::SharedWithId).uuid().not_null())
                    .col(ColumnDef::new(Partners::InTimeline).boolean().not_null())
                    .col(ColumnDef::new(Partners::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Partners::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Partners::CreateId).big_integer().not_null())
                    .col(ColumnDef::new(Partners::UpdateId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(Partners::SharedById)
                            .col(Partners::SharedWithId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partners_update_id")
                    .table(Partners::Table)
                    .col(Partners::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_partners_create_id")
                    .table(Partners::Table)
                    .col(Partners::CreateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Assets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Assets::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Assets::OriginalFileName).text().not_null())
                    .col(ColumnDef::new(Assets::Kind).text().not_null())
                    .col(ColumnDef::new(Assets::Visibility).text().not_null())
                    .col(ColumnDef::new(Assets::IsFavorite).boolean().not_null())
                    .col(ColumnDef::new(Assets::FileCreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Assets::DeletedAt).timestamp())
                    .col(ColumnDef::new(Assets::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Assets::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Assets::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_owner_id")
                    .table(Assets::Table)
                    .col(Assets::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_update_id")
                    .table(Assets::Table)
                    .col(Assets::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assets_file_created_at")
                    .table(Assets::Table)
                    .col(Assets::FileCreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Exif::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Exif::AssetId).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Exif::City).text())
                    .col(ColumnDef::new(Exif::State).text())
                    .col(ColumnDef::new(Exif::Country).text())
                    .col(ColumnDef::new(Exif::Make).text())
                    .col(ColumnDef::new(Exif::Model).text())
                    .col(ColumnDef::new(Exif::LensModel).text())
                    .col(ColumnDef::new(Exif::Rating).integer())
                    .col(ColumnDef::new(Exif::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Exif::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exif_update_id")
                    .table(Exif::Table)
                    .col(Exif::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Stacks::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Stacks::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Stacks::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Stacks::PrimaryAssetId).uuid().not_null())
                    .col(ColumnDef::new(Stacks::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Stacks::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Stacks::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stacks_owner_id")
                    .table(Stacks::Table)
                    .col(Stacks::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_stacks_update_id")
                    .table(Stacks::Table)
                    .col(Stacks::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memories::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Memories::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Memories::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Memories::MemoryType).text().not_null())
                    .col(ColumnDef::new(Memories::Data).json().not_null())
                    .col(ColumnDef::new(Memories::IsSaved).boolean().not_null())
                    .col(ColumnDef::new(Memories::MemoryAt).timestamp().not_null())
                    .col(ColumnDef::new(Memories::SeenAt).timestamp())
                    .col(ColumnDef::new(Memories::ShowAt).timestamp())
                    .col(ColumnDef::new(Memories::HideAt).timestamp())
                    .col(ColumnDef::new(Memories::DeletedAt).timestamp())
                    .col(ColumnDef::new(Memories::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Memories::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Memories::UpdateId).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memories_owner_id")
                    .table(Memories::Table)
                    .col(Memories::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memories_update_id")
                    .table(Memories::Table)
                    .col(Memories::UpdateId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MemoryAssets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MemoryAssets::MemoryId).uuid().not_null())
                    .col(ColumnDef::new(MemoryAssets::AssetId).uuid().not_null())
                    .col(ColumnDef::new(MemoryAssets::UpdatedAt).timestamp().not_null())
                    .col(ColumnDef::new(MemoryAssets::UpdateId).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(MemoryAssets::MemoryId)
                            .col(MemoryAssets::AssetId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_memory_assets_update_id")
                    .table(MemoryAssets::Table)
                    .col(MemoryAssets::UpdateId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MemoryAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Stacks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Exif::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum Partners {
    Table,
    SharedById,
    SharedWithId,
    InTimeline,
    CreatedAt,
    UpdatedAt,
    CreateId,
    UpdateId,
}

#[derive(DeriveIden)]
enum Assets {
    Table,
    Id,
    OwnerId,
    OriginalFileName,
    Kind,
    Visibility,
    IsFavorite,
    FileCreatedAt,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum Exif {
    Table,
    AssetId,
    City,
    State,
    Country,
    Make,
    Model,
    LensModel,
    Rating,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum Stacks {
    Table,
    Id,
    OwnerId,
    PrimaryAssetId,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum Memories {
    Table,
    Id,
    OwnerId,
    MemoryType,
    Data,
    IsSaved,
    MemoryAt,
    SeenAt,
    ShowAt,
    HideAt,
    DeletedAt,
    CreatedAt,
    UpdatedAt,
    UpdateId,
}

#[derive(DeriveIden)]
enum MemoryAssets {
    Table,
    MemoryId,
    AssetId,
    UpdatedAt,
    UpdateId,
}
