//! Database migrations for the Voice Admin backend.
//!
//! Each migration creates one table of the organization-scoped schema.
//! Order matters: tenant roots and catalogs come before the rows that
//! reference them.

pub use sea_orm_migration::prelude::*;

mod m2025_02_03_090000_create_billing_packages;
mod m2025_02_03_090100_create_organizations;
mod m2025_02_03_090200_create_users;
mod m2025_02_03_090300_create_agents;
mod m2025_02_03_090400_create_call_logs;
mod m2025_02_10_140000_create_integrations;
mod m2025_02_10_140100_create_phone_numbers;
mod m2025_02_10_140200_create_rag_configurations;
mod m2025_03_01_101500_create_payments;
mod m2025_03_14_083000_create_batch_calls;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2025_02_03_090000_create_billing_packages::Migration),
            Box::new(m2025_02_03_090100_create_organizations::Migration),
            Box::new(m2025_02_03_090200_create_users::Migration),
            Box::new(m2025_02_03_090300_create_agents::Migration),
            Box::new(m2025_02_03_090400_create_call_logs::Migration),
            Box::new(m2025_02_10_140000_create_integrations::Migration),
            Box::new(m2025_02_10_140100_create_phone_numbers::Migration),
            Box::new(m2025_02_10_140200_create_rag_configurations::Migration),
            Box::new(m2025_03_01_101500_create_payments::Migration),
            Box::new(m2025_03_14_083000_create_batch_calls::Migration),
        ]
    }
}
