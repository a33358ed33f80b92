//! Migration to create the agents table.
//!
//! Agents mirror the configuration of an externally hosted voice agent. The
//! external agent id is stored as plain text and is not referentially
//! enforced.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Agents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Agents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Agents::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(Agents::Name).text().not_null())
                    .col(ColumnDef::new(Agents::ElevenlabsAgentId).text().null())
                    .col(ColumnDef::new(Agents::FirstMessage).text().null())
                    .col(ColumnDef::new(Agents::SystemPrompt).text().null())
                    .col(
                        ColumnDef::new(Agents::Language)
                            .text()
                            .not_null()
                            .default("en"),
                    )
                    .col(ColumnDef::new(Agents::Settings).json_binary().not_null())
                    .col(
                        ColumnDef::new(Agents::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Agents::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_agents_organization_id")
                            .from(Agents::Table, Agents::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Composite index backing the (id, organization_id) ownership filter
        manager
            .create_index(
                Index::create()
                    .name("idx_agents_organization_created")
                    .table(Agents::Table)
                    .col(Agents::OrganizationId)
                    .col(Agents::CreatedAt)
                    .col(Agents::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_agents_organization_created")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Agents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Agents {
    Table,
    Id,
    OrganizationId,
    Name,
    ElevenlabsAgentId,
    FirstMessage,
    SystemPrompt,
    Language,
    Settings,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
