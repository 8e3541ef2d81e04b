pub use sea_orm_migration::prelude::*;

mod m20251001_000001_initial;
mod m20251001_000002_add_monthly_draws;
mod m20251001_000003_add_payments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_initial::Migration),
            Box::new(m20251001_000002_add_monthly_draws::Migration),
            Box::new(m20251001_000003_add_payments::Migration),
        ]
    }
}
