//! Redis-backed cache store

use async_trait::async_trait;
use redis::{AsyncCommands, RedisResult};
use std::time::Duration;

use super::pool::RedisPool;
use crate::storage::traits::CacheStore;
use crate::utils::error::{GatewayError, Result};

/// Cache store writing values with `SET key value EX ttl`
#[derive(Debug, Clone)]
pub struct RedisCacheStore {
    pool: RedisPool,
}

impl RedisCacheStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }
}

/// Expiry in whole seconds; EX 0 is rejected by Redis
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.pool.get_connection();
        let result: RedisResult<Option<String>> = conn.get(key).await;
        match result {
            Ok(value) => Ok(value),
            Err(e) if e.kind() == redis::ErrorKind::TypeError => Ok(None),
            Err(e) => Err(GatewayError::Redis(e)),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.pool.get_connection();
        let _: () = conn
            .set_ex(key, value, expiry_seconds(ttl))
            .await
            .map_err(GatewayError::Redis)?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.pool.get_connection();
        let _: () = conn.del(key).await.map_err(GatewayError::Redis)?;
        Ok(())
    }

    async fn health_check(&self) -> Result<()> {
        self.pool.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_is_at_least_one_second() {
        assert_eq!(expiry_seconds(Duration::ZERO), 1);
        assert_eq!(expiry_seconds(Duration::from_millis(400)), 1);
        assert_eq!(expiry_seconds(Duration::from_secs(3600)), 3600);
    }
}
