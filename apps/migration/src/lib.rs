//! Schema migrations.
//!
//! The initial schema is derived from the SeaORM entities so migrations and
//! the test schema never drift apart.

pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_schema;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20240101_000001_create_schema::Migration)]
    }
}
