//! Database schema of the Fakebook backend.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user_center;
mod m20240101_000002_create_fakebook;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user_center::Migration),
            Box::new(m20240101_000002_create_fakebook::Migration),
        ]
    }
}
