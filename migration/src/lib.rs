pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_loyalty_schema;
mod m20260312_000002_add_rewards_and_notifications;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_loyalty_schema::Migration),
            Box::new(m20260312_000002_add_rewards_and_notifications::Migration),
        ]
    }
}
