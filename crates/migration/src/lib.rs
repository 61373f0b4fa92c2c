pub use sea_orm_migration::prelude::*;

mod m20260810_120000_transactions;
mod m20260810_130000_subscribers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260810_120000_transactions::Migration),
            Box::new(m20260810_130000_subscribers::Migration),
        ]
    }
}
