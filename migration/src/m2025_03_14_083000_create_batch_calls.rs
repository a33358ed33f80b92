//! Migration to create the batch_calls and batch_call_recipients tables.
//!
//! Recipients carry their own `organization_id` so status writes can be
//! guarded without joining through the parent.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BatchCalls::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BatchCalls::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BatchCalls::OrganizationId).uuid().not_null())
                    .col(ColumnDef::new(BatchCalls::AgentId).uuid().not_null())
                    .col(ColumnDef::new(BatchCalls::Name).text().not_null())
                    .col(
                        ColumnDef::new(BatchCalls::ScheduledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BatchCalls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batch_calls_organization_id")
                            .from(BatchCalls::Table, BatchCalls::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BatchCallRecipients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BatchCallRecipients::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::BatchCallId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::OrganizationId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::PhoneNumber)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::ExternalCallId)
                            .text()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BatchCallRecipients::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_batch_call_recipients_batch_call_id")
                            .from(BatchCallRecipients::Table, BatchCallRecipients::BatchCallId)
                            .to(BatchCalls::Table, BatchCalls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_batch_call_recipients_batch_number")
                    .table(BatchCallRecipients::Table)
                    .col(BatchCallRecipients::BatchCallId)
                    .col(BatchCallRecipients::PhoneNumber)
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
                    .name("idx_batch_call_recipients_batch_number")
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(BatchCallRecipients::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(BatchCalls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum BatchCalls {
    Table,
    Id,
    OrganizationId,
    AgentId,
    Name,
    ScheduledAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BatchCallRecipients {
    Table,
    Id,
    BatchCallId,
    OrganizationId,
    PhoneNumber,
    Status,
    ExternalCallId,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Organizations {
    Table,
    Id,
}
