use crate::core::models::{UsageRecord, UsageStatus};
use crate::storage::traits::UsageStore;
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, usage_log};
use super::types::SeaOrmDatabase;

#[async_trait]
impl UsageStore for SeaOrmDatabase {
    async fn append(&self, record: UsageRecord) -> Result<()> {
        debug!(
            "Recording usage: model={}, tokens={}, status={}",
            record.model_id, record.tokens_used, record.status
        );

        entities::UsageLog::insert(usage_log::Model::from_domain_record(&record))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    async fn sum_tokens(
        &self,
        model_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        // SUM over BIGINT is NUMERIC on PostgreSQL, so cast back for a uniform i64
        let total: Option<i64> = entities::UsageLog::find()
            .select_only()
            .column_as(
                Expr::cust("CAST(COALESCE(SUM(tokens_used), 0) AS BIGINT)"),
                "total",
            )
            .filter(usage_log::Column::ModelId.eq(model_id))
            .filter(usage_log::Column::Status.eq(UsageStatus::Success.as_str()))
            .filter(usage_log::Column::CreatedAt.gte(from))
            .filter(usage_log::Column::CreatedAt.lt(to))
            .into_tuple::<i64>()
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(total.unwrap_or(0))
    }

    async fn list_for_model(&self, model_id: Uuid, limit: u64) -> Result<Vec<UsageRecord>> {
        let records = entities::UsageLog::find()
            .filter(usage_log::Column::ModelId.eq(model_id))
            .order_by_desc(usage_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(records
            .into_iter()
            .map(usage_log::Model::to_domain_record)
            .collect())
    }
}
