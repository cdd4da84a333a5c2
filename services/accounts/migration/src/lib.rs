pub use sea_orm_migration::prelude::*;

mod m20260301_000001_create_accounts;
mod m20260301_000002_create_videos;
mod m20260301_000003_create_subscriptions;
mod m20260301_000004_create_likes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_create_accounts::Migration),
            Box::new(m20260301_000002_create_videos::Migration),
            Box::new(m20260301_000003_create_subscriptions::Migration),
            Box::new(m20260301_000004_create_likes::Migration),
        ]
    }
}
