//! Per-request context: identity, cancellation and deadline

use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::utils::error::{GatewayError, Result};
use crate::utils::generate_request_id;

/// Request context for tracking, cancellation and deadlines
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request ID
    pub request_id: String,
    /// User ID
    pub user_id: Option<String>,
    /// Session ID
    pub session_id: Option<String>,
    /// Cancelled when the caller goes away
    pub cancel: CancellationToken,
    /// Absolute deadline for the whole request
    pub deadline: Option<Instant>,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            request_id: generate_request_id(),
            user_id: None,
            session_id: None,
            cancel: CancellationToken::new(),
            deadline: None,
        }
    }
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Copy of this context with a deadline `timeout` from now, unless one is already set
    pub fn or_timeout(&self, timeout: Duration) -> Self {
        let mut ctx = self.clone();
        if ctx.deadline.is_none() && !timeout.is_zero() {
            ctx.deadline = Some(Instant::now() + timeout);
        }
        ctx
    }

    /// Copy sharing this context's cancellation, with a deadline halfway to the current one.
    ///
    /// Without a deadline the copy is unbounded too.
    pub fn split_deadline(&self) -> Self {
        let mut ctx = self.clone();
        if let Some(remaining) = self.remaining() {
            ctx.deadline = Some(Instant::now() + remaining / 2);
        }
        ctx
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Time left before the deadline, if one is set
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Await `fut`, racing it against cancellation and the deadline.
    ///
    /// Cancellation wins over a simultaneous result. The future is dropped when it loses.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let deadline = self.deadline;
        let expiry = async move {
            match deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(GatewayError::cancelled(format!("request {} cancelled", self.request_id)))
            }
            _ = expiry => {
                Err(GatewayError::timeout(format!("request {} exceeded its deadline", self.request_id)))
            }
            result = fut => result,
        }
    }
}
