//! Storage layer
//!
//! Model configurations and the usage ledger live in a SeaORM database or in memory;
//! cached completions live in Redis or in memory.

pub mod database;
pub mod memory;
#[cfg(feature = "redis")]
pub mod redis;
pub mod traits;

pub use database::Database;
pub use memory::{InMemoryCacheStore, InMemoryStore};
#[cfg(feature = "redis")]
pub use self::redis::{RedisCacheStore, RedisPool};
pub use traits::{CacheStore, ModelStore, UsageStore};
