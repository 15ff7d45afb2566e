pub use sea_orm_migration::prelude::*;

mod m20260112_000000_create_catalog;
mod m20260112_000001_create_integration_event_log;
mod m20260113_000000_seed_catalog_reference_data;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260112_000000_create_catalog::Migration),
            Box::new(m20260112_000001_create_integration_event_log::Migration),
            Box::new(m20260113_000000_seed_catalog_reference_data::Migration),
        ]
    }
}
