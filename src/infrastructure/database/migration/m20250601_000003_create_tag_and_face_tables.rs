//! Tags, the tag hierarchy closure and detected faces

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Tags::Value).text().not_null())
                    .col(ColumnDef::new(Tags::ParentId).uuid())
                    .col(ColumnDef::new(Tags::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Tags::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TagsClosure::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TagsClosure::AncestorId).uuid().not_null())
                    .col(ColumnDef::new(TagsClosure::DescendantId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(TagsClosure::AncestorId)
                            .col(TagsClosure::DescendantId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tags_closure_descendant_id")
                    .table(TagsClosure::Table)
                    .col(TagsClosure::DescendantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TagAssets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TagAssets::TagId).uuid().not_null())
                    .col(ColumnDef::new(TagAssets::AssetId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(TagAssets::TagId)
                            .col(TagAssets::AssetId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_tag_assets_asset_id")
                    .table(TagAssets::Table)
                    .col(TagAssets::AssetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssetFaces::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AssetFaces::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AssetFaces::AssetId).uuid().not_null())
                    .col(ColumnDef::new(AssetFaces::PersonId).uuid())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_asset_faces_asset_id")
                    .table(AssetFaces::Table)
                    .col(AssetFaces::AssetId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_asset_faces_person_id")
                    .table(AssetFaces::Table)
                    .col(AssetFaces::PersonId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AssetFaces::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagAssets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TagsClosure::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Tags {
    Table,
    Id,
    Value,
    ParentId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TagsClosure {
    Table,
    AncestorId,
    DescendantId,
}

#[derive(DeriveIden)]
enum TagAssets {
    Table,
    TagId,
    AssetId,
}

#[derive(DeriveIden)]
enum AssetFaces {
    Table,
    Id,
    AssetId,
    PersonId,
}
