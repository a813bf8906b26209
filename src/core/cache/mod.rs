//! Deterministic response cache

pub mod key;
pub mod response_cache;

pub use key::{CACHE_KEY_PREFIX, cache_key, is_cacheable};
pub use response_cache::ResponseCache;
