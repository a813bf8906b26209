//! Token usage ledger and quota evaluation

use chrono::{DateTime, Local, TimeZone, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::window::{next_midnight, start_of_day, start_of_month};
use crate::core::models::{LogUsagePayload, ModelConfig, QuotaStatus, UsageRecord};
use crate::storage::{ModelStore, UsageStore};
use crate::utils::error::{GatewayError, Result};

/// Append-only usage accounting with daily and monthly quota evaluation.
///
/// Admission is advisory: evaluation sees usage recorded before the call, so concurrent
/// requests may overshoot a limit by their own consumption.
#[derive(Clone)]
pub struct QuotaLedger {
    models: Arc<dyn ModelStore>,
    usage: Arc<dyn UsageStore>,
}

impl QuotaLedger {
    pub fn new(models: Arc<dyn ModelStore>, usage: Arc<dyn UsageStore>) -> Self {
        Self { models, usage }
    }

    /// Append one usage record.
    ///
    /// Cost is computed from the model's price at the time of recording.
    pub async fn record_usage(&self, payload: LogUsagePayload) -> Result<UsageRecord> {
        if payload.tokens_used < 0 {
            return Err(GatewayError::bad_request("tokens used must not be negative"));
        }

        let model = self
            .models
            .find(&payload.model_id)
            .await?
            .ok_or_else(|| GatewayError::ModelNotFound(payload.model_id.clone()))?;

        let record = UsageRecord {
            id: Uuid::new_v4(),
            model_id: model.id,
            user_id: payload.user_id,
            session_id: payload.session_id,
            prompt_hash: payload.prompt_hash,
            tokens_used: payload.tokens_used,
            cost: model.cost_for(payload.tokens_used),
            latency_ms: payload.latency_ms.max(0),
            status: payload.status,
            error_message: payload.error_message,
            created_at: payload.created_at.unwrap_or_else(Utc::now),
        };

        self.usage.append(record.clone()).await?;
        debug!(
            "Recorded {} tokens ({}) for model {}",
            record.tokens_used, record.status, model.name
        );

        Ok(record)
    }

    /// Quota status of a model, looked up by id or name
    pub async fn evaluate<Tz>(&self, id_or_name: &str, now: DateTime<Tz>) -> Result<QuotaStatus>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let model = self
            .models
            .find(id_or_name)
            .await?
            .ok_or_else(|| GatewayError::ModelNotFound(id_or_name.to_string()))?;

        self.evaluate_model(&model, now).await
    }

    /// Quota status of an already resolved model.
    ///
    /// Sums successful usage over `[start of day, now)` and `[start of month, now)` in
    /// `now`'s time zone.
    pub async fn evaluate_model<Tz>(&self, model: &ModelConfig, now: DateTime<Tz>) -> Result<QuotaStatus>
    where
        Tz: TimeZone + Send + Sync,
        Tz::Offset: Send + Sync,
    {
        let day_start = start_of_day(&now).with_timezone(&Utc);
        let month_start = start_of_month(&now).with_timezone(&Utc);
        let reset_time = next_midnight(&now).fixed_offset();
        let end = now.with_timezone(&Utc);

        let daily_used = self.usage.sum_tokens(model.id, day_start, end).await?;
        let monthly_used = self.usage.sum_tokens(model.id, month_start, end).await?;

        Ok(QuotaStatus {
            exceeded: QuotaStatus::is_exceeded(
                daily_used,
                model.quota_daily,
                monthly_used,
                model.quota_monthly,
            ),
            daily_used,
            daily_limit: model.quota_daily,
            monthly_used,
            monthly_limit: model.quota_monthly,
            reset_time,
        })
    }

    /// Quota status in the process's local time zone
    pub async fn check(&self, id_or_name: &str) -> Result<QuotaStatus> {
        self.evaluate(id_or_name, Local::now()).await
    }

    /// Admission pre-check: fails with `QuotaExceeded` when prior usage has reached a limit
    pub async fn admit(&self, model: &ModelConfig) -> Result<QuotaStatus> {
        let status = self.evaluate_model(model, Local::now()).await?;
        if status.exceeded {
            warn!(
                "Quota exceeded for model {}: daily {}/{}, monthly {}/{}",
                model.name,
                status.daily_used,
                status.daily_limit,
                status.monthly_used,
                status.monthly_limit
            );
            return Err(GatewayError::quota_exceeded(format!(
                "quota exceeded for model {}",
                model.name
            )));
        }
        Ok(status)
    }

    /// Most recent usage records for a model
    pub async fn recent_usage(&self, model_id: Uuid, limit: u64) -> Result<Vec<UsageRecord>> {
        self.usage.list_for_model(model_id, limit).await
    }
}

impl std::fmt::Debug for QuotaLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaLedger").finish_non_exhaustive()
    }
}
