//! In-process cache store with per-entry expiry

use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::storage::traits::CacheStore;
use crate::utils::error::Result;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// Bounded in-memory key-value store.
///
/// When full, expired entries are dropped first, then the entry closest to expiry.
#[derive(Debug)]
pub struct InMemoryCacheStore {
    entries: DashMap<String, Entry>,
    max_entries: usize,
}

impl InMemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: max_entries.max(1),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn make_room(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);

        while self.entries.len() >= self.max_entries {
            let victim = self
                .entries
                .iter()
                .min_by_key(|entry| entry.expires_at)
                .map(|entry| entry.key().clone());
            match victim {
                Some(key) => {
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

impl Default for InMemoryCacheStore {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let value = match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
            Some(_) => None,
            None => return Ok(None),
        };
        self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        if !self.entries.contains_key(key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }
        self.entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_ttl_enforced() {
        let store = InMemoryCacheStore::new(10);
        store.set("k", "v", Duration::from_secs(5)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(5)).await;
        assert!(store.get("k").await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_evicts_soonest_expiry() {
        let store = InMemoryCacheStore::new(2);
        store.set("a", "1", Duration::from_secs(10)).await.unwrap();
        store.set("b", "2", Duration::from_secs(100)).await.unwrap();
        store.set("c", "3", Duration::from_secs(50)).await.unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get("a").await.unwrap().is_none());
        assert!(store.get("b").await.unwrap().is_some());
        assert!(store.get("c").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_overwrite_and_delete() {
        let store = InMemoryCacheStore::new(1);
        store.set("k", "1", Duration::from_secs(60)).await.unwrap();
        store.set("k", "2", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("2"));

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap().is_none());
    }
}
