//! Shared change sequence backing both update ids and audit ids

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChangeSequence::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChangeSequence::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChangeSequence::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ChangeSequence::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ChangeSequence {
    Table,
    Id,
    CreatedAt,
}
