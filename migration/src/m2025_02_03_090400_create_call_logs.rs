//! Migration to create the call_logs table.
//!
//! Call logs are an append-only record of externally produced call events.
//! `agent_id` intentionally carries no foreign key so history survives agent
//! deletion.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CallLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CallLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CallLogs::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(CallLogs::AgentId).uuid().not_null())
                    .col(ColumnDef::new(CallLogs::ExternalCallId).text().null())
                    .col(
                        ColumnDef::new(CallLogs::Direction)
                            .text()
                            .not_null()
                            .default("inbound"),
                    )
                    .col(ColumnDef::new(CallLogs::FromNumber).text().null())
                    .col(ColumnDef::new(CallLogs::ToNumber).text().null())
                    .col(ColumnDef::new(CallLogs::Status).text().not_null())
                    .col(
                        ColumnDef::new(CallLogs::DurationSeconds)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(CallLogs::CostCredits)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(CallLogs::Transcript).json_binary().null())
                    .col(
                        ColumnDef::new(CallLogs::StartedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(CallLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_call_logs_organization_id")
                            .from(CallLogs::Table, CallLogs::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_call_logs_organization_created")
                    .table(CallLogs::Table)
                    .col(CallLogs::OrganizationId)
                    .col(CallLogs::CreatedAt)
                    .col(CallLogs::Id)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_call_logs_agent_id")
                    .table(CallLogs::Table)
                    .col(CallLogs::AgentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_call_logs_agent_id").to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_call_logs_organization_created")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CallLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CallLogs {
    Table,
    Id,
    OrganizationId,
    AgentId,
    ExternalCallId,
    Direction,
    FromNumber,
    ToNumber,
    Status,
    DurationSeconds,
    CostCredits,
    Transcript,
    StartedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
