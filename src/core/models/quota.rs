//! Derived quota view

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Quota usage of one model at a point in time. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaStatus {
    pub exceeded: bool,
    pub daily_used: i64,
    pub daily_limit: i64,
    pub monthly_used: i64,
    pub monthly_limit: i64,
    /// Midnight of the following day in the evaluator's time zone
    pub reset_time: DateTime<FixedOffset>,
}

impl QuotaStatus {
    /// Apply the limit rule: a limit of 0 is unlimited, otherwise used >= limit is exceeded
    pub fn is_exceeded(daily_used: i64, daily_limit: i64, monthly_used: i64, monthly_limit: i64) -> bool {
        (daily_limit > 0 && daily_used >= daily_limit)
            || (monthly_limit > 0 && monthly_used >= monthly_limit)
    }

    /// Tokens left today, `None` when unlimited
    pub fn daily_remaining(&self) -> Option<i64> {
        (self.daily_limit > 0).then(|| (self.daily_limit - self.daily_used).max(0))
    }

    /// Tokens left this month, `None` when unlimited
    pub fn monthly_remaining(&self) -> Option<i64> {
        (self.monthly_limit > 0).then(|| (self.monthly_limit - self.monthly_used).max(0))
    }
}
