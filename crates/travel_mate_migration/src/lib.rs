pub use sea_orm_migration::prelude::*;

mod m20250118_000001_create_trip;
mod m20250118_000002_create_packing;
mod m20250125_000001_create_tips;
mod m20250201_000001_create_chat_message;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250118_000001_create_trip::Migration),
            Box::new(m20250118_000002_create_packing::Migration),
            Box::new(m20250125_000001_create_tips::Migration),
            Box::new(m20250201_000001_create_chat_message::Migration),
        ]
    }
}
