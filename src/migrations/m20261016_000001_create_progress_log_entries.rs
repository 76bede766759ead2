//! Migration: Create progress_log_entries table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProgressLogEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProgressLogEntries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::Task)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::Action)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ProgressLogEntries::Who).string_len(256).null())
                    .col(
                        ColumnDef::new(ProgressLogEntries::Started)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::Ended)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::IpAddress)
                            .string_len(64)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::ResultMessage)
                            .string_len(16)
                            .not_null()
                            .default("Started"),
                    )
                    .col(
                        ColumnDef::new(ProgressLogEntries::ResultInfo)
                            .string_len(255)
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_progress_log_entries_task_action")
                    .table(ProgressLogEntries::Table)
                    .col(ProgressLogEntries::Task)
                    .col(ProgressLogEntries::Action)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_progress_log_entries_ended")
                    .table(ProgressLogEntries::Table)
                    .col(ProgressLogEntries::Ended)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_progress_log_entries_result_message")
                    .table(ProgressLogEntries::Table)
                    .col(ProgressLogEntries::ResultMessage)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(ProgressLogEntries::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
#[iden = "progress_log_entries"]
enum ProgressLogEntries {
    Table,
    Id,
    Task,
    Action,
    Who,
    Started,
    Ended,
    #[iden = "ip_address"]
    IpAddress,
    #[iden = "result_message"]
    ResultMessage,
    #[iden = "result_info"]
    ResultInfo,
}
