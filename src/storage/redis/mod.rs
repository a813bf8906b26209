//! Redis storage implementation
//!
//! - `pool` - Connection pool and core connection management
//! - `cache` - Response cache store backed by `SET EX`

mod cache;
mod pool;

pub use cache::RedisCacheStore;
pub use pool::RedisPool;
