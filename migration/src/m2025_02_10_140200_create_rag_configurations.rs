//! Migration to create the rag_configurations table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RagConfigurations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RagConfigurations::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RagConfigurations::AgentId).uuid().null())
                    .col(ColumnDef::new(RagConfigurations::Name).text().not_null())
                    .col(
                        ColumnDef::new(RagConfigurations::EmbeddingModel)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::ChunkSize)
                            .integer()
                            .not_null()
                            .default(1000),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::ChunkOverlap)
                            .integer()
                            .not_null()
                            .default(200),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::DocumentIds)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::Status)
                            .text()
                            .not_null()
                            .default("PENDING_APPROVAL"),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RagConfigurations::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rag_configurations_organization_id")
                            .from(RagConfigurations::Table, RagConfigurations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rag_configurations_agent_id")
                            .from(RagConfigurations::Table, RagConfigurations::AgentId)
                            .to(Agents::Table, Agents::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_rag_configurations_organization_id")
                    .table(RagConfigurations::Table)
                    .col(RagConfigurations::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_rag_configurations_organization_id")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(RagConfigurations::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum RagConfigurations {
    Table,
    Id,
    OrganizationId,
    AgentId,
    Name,
    EmbeddingModel,
    ChunkSize,
    ChunkOverlap,
    DocumentIds,
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
