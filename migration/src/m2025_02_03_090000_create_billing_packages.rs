//! Migration to create the billing_packages table.
//!
//! Billing packages are a tenant-independent catalog; organizations reference
//! them but never own them.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BillingPackages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BillingPackages::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BillingPackages::Name).text().not_null())
                    .col(
                        ColumnDef::new(BillingPackages::PriceCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::MonthlyCredits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::MaxAgents)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::MaxUsers)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BillingPackages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BillingPackages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BillingPackages {
    Table,
    Id,
    Name,
    PriceCents,
    MonthlyCredits,
    MaxAgents,
    MaxUsers,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
