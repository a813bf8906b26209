//! Security configuration

use serde::{Deserialize, Serialize};
use std::fmt;

/// Encryption-at-rest configuration
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Master secret for API key encryption. Any length; it is hashed to a 256-bit key.
    #[serde(default)]
    pub master_key: String,
}

impl fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("master_key", &"***")
            .finish()
    }
}
