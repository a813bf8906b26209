//! Request pipeline configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Request pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Default per-request deadline in seconds, applied when the caller sets none
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    /// Fallback model per primary model (id or name on both sides)
    #[serde(default)]
    pub fallbacks: HashMap<String, String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_timeout: default_request_timeout(),
            fallbacks: HashMap::new(),
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout_duration(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout)
    }
}
