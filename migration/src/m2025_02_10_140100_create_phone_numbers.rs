//! Migration to create the phone_numbers table.
//!
//! A number is unique within an organization. The optional agent assignment
//! is nulled when the agent goes away.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PhoneNumbers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PhoneNumbers::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PhoneNumbers::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(PhoneNumbers::AgentId).uuid().null())
                    .col(ColumnDef::new(PhoneNumbers::Number).text().not_null())
                    .col(ColumnDef::new(PhoneNumbers::Label).text().null())
                    .col(
                        ColumnDef::new(PhoneNumbers::Provider)
                            .text()
                            .not_null()
                            .default("twilio"),
                    )
                    .col(
                        ColumnDef::new(PhoneNumbers::Status)
                            .text()
                            .not_null()
                            .default("PENDING_APPROVAL"),
                    )
                    .col(
                        ColumnDef::new(PhoneNumbers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PhoneNumbers::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phone_numbers_organization_id")
                            .from(PhoneNumbers::Table, PhoneNumbers::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_phone_numbers_agent_id")
                            .from(PhoneNumbers::Table, PhoneNumbers::AgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_phone_numbers_organization_number")
                    .table(PhoneNumbers::Table)
                    .col(PhoneNumbers::OrganizationId)
                    .col(PhoneNumbers::Number)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_phone_numbers_organization_number")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(PhoneNumbers::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum PhoneNumbers {
    Table,
    Id,
    OrganizationId,
    AgentId,
    Number,
    Label,
    Provider,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Agents {
    Table,
    Id,
}
