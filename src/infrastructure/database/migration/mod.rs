//! Database migrations

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_catalog_tables::Migration),
            Box::new(m20250601_000002_create_album_tables::Migration),
            Box::new(m20250601_000003_create_tag_and_face_tables::Migration),
            Box::new(m20250601_000004_create_audit_tables::Migration),
            Box::new(m20250601_000005_create_change_sequence::Migration),
        ]
    }
}

mod m20250601_000001_create_catalog_tables;
mod m20250601_000002_create_album_tables;
mod m20250601_000003_create_tag_and_face_tables;
mod m20250601_000004_create_audit_tables;
mod m20250601_000005_create_change_sequence;
