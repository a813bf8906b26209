//! Time-bounded cache of decrypted credentials

use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::core::models::Credentials;

#[derive(Clone)]
struct CachedCredentials {
    credentials: Credentials,
    expires_at: Instant,
}

/// Credential cache keyed by secret store path.
///
/// Entries expire `ttl` after insertion. Expired entries are never returned, and
/// [`CredentialCache::purge_expired`] reclaims them.
pub struct CredentialCache {
    entries: DashMap<String, CachedCredentials>,
    ttl: Duration,
}

impl CredentialCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, path: &str) -> Option<Credentials> {
        let entry = self.entries.get(path)?;
        if entry.expires_at <= Instant::now() {
            drop(entry);
            self.entries
                .remove_if(path, |_, cached| cached.expires_at <= Instant::now());
            return None;
        }
        Some(entry.credentials.clone())
    }

    pub fn insert(&self, path: impl Into<String>, credentials: Credentials) {
        self.entries.insert(
            path.into(),
            CachedCredentials {
                credentials,
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Drop expired entries, returning how many were removed
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, cached| cached.expires_at > now);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for CredentialCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .finish()
    }
}
