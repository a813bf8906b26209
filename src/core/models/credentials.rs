//! Decrypted provider credentials

use crate::utils::logging::mask_secret;
use std::collections::HashMap;
use std::fmt;

/// Decrypted credentials for one model.
///
/// Never persisted and never logged; `Debug` masks every key.
#[derive(Clone, PartialEq, Default)]
pub struct Credentials {
    pub api_key: String,
    /// Additional keys for round-robin balancing
    pub extra_keys: Vec<String>,
    pub base_url: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The key pool: the primary key followed by distinct extra keys
    pub fn key_pool(&self) -> Vec<String> {
        let mut keys = vec![self.api_key.clone()];
        for key in &self.extra_keys {
            if !key.is_empty() && !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    /// Copy of these credentials bound to a single selected key
    pub fn with_selected_key(&self, api_key: String) -> Self {
        Self {
            api_key,
            extra_keys: Vec::new(),
            base_url: self.base_url.clone(),
            headers: self.headers.clone(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extra: Vec<String> = self.extra_keys.iter().map(|k| mask_secret(k)).collect();
        f.debug_struct("Credentials")
            .field("api_key", &mask_secret(&self.api_key))
            .field("extra_keys", &extra)
            .field("base_url", &self.base_url)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .finish()
    }
}
