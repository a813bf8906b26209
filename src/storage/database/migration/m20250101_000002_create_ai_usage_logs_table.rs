use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiUsageLogs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiUsageLogs::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(AiUsageLogs::ModelId).uuid().not_null())
                    .col(ColumnDef::new(AiUsageLogs::UserId).string_len(255).null())
                    .col(ColumnDef::new(AiUsageLogs::SessionId).string_len(255).null())
                    .col(ColumnDef::new(AiUsageLogs::PromptHash).string_len(64).not_null())
                    .col(ColumnDef::new(AiUsageLogs::TokensUsed).big_integer().not_null())
                    .col(
                        ColumnDef::new(AiUsageLogs::Cost)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(AiUsageLogs::LatencyMs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(AiUsageLogs::Status).string_len(50).not_null())
                    .col(ColumnDef::new(AiUsageLogs::ErrorMessage).text().null())
                    .col(
                        ColumnDef::new(AiUsageLogs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Quota windows are summed per model over a created_at range
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_usage_model_created")
                    .table(AiUsageLogs::Table)
                    .col(AiUsageLogs::ModelId)
                    .col(AiUsageLogs::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_usage_prompt_hash")
                    .table(AiUsageLogs::Table)
                    .col(AiUsageLogs::PromptHash)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiUsageLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AiUsageLogs {
    Table,
    Id,
    ModelId,
    UserId,
    SessionId,
    PromptHash,
    TokensUsed,
    Cost,
    LatencyMs,
    Status,
    ErrorMessage,
    CreatedAt,
}
