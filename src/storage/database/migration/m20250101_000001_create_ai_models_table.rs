use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AiModels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(AiModels::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(AiModels::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(AiModels::Provider).string_len(100).not_null())
                    .col(ColumnDef::new(AiModels::ModelId).string_len(255).not_null())
                    .col(ColumnDef::new(AiModels::BaseUrl).text().not_null())
                    .col(ColumnDef::new(AiModels::EncryptedApiKey).text().not_null())
                    .col(ColumnDef::new(AiModels::Config).json().not_null())
                    .col(
                        ColumnDef::new(AiModels::QuotaDaily)
                            .big_integer()
                            .not_null()
                            .default(100_000),
                    )
                    .col(
                        ColumnDef::new(AiModels::QuotaMonthly)
                            .big_integer()
                            .not_null()
                            .default(3_000_000),
                    )
                    .col(
                        ColumnDef::new(AiModels::CostPer1kTokens)
                            .double()
                            .not_null()
                            .default(0.0),
                    )
                    .col(
                        ColumnDef::new(AiModels::Status)
                            .string_len(50)
                            .not_null()
                            .default("active"),
                    )
                    .col(
                        ColumnDef::new(AiModels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(AiModels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ai_models_provider")
                    .table(AiModels::Table)
                    .col(AiModels::Provider)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_ai_models_status")
                    .table(AiModels::Table)
                    .col(AiModels::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AiModels::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum AiModels {
    Table,
    Id,
    Name,
    Provider,
    ModelId,
    BaseUrl,
    EncryptedApiKey,
    Config,
    QuotaDaily,
    QuotaMonthly,
    #[sea_orm(iden = "cost_per_1k_tokens")]
    CostPer1kTokens,
    Status,
    CreatedAt,
    UpdatedAt,
}
