//! Core gateway functionality
//!
//! The admission-and-resilience pipeline and the parts it is built from:
//!
//! - **vault**: credential encryption and cached secret store reads
//! - **quota**: daily and monthly token accounting
//! - **cache**: deterministic response cache
//! - **circuit_breaker**: per-provider failure isolation with fallback
//! - **router**: model resolution, provider instances and key balancing
//! - **pipeline**: the request lifecycle composing all of the above
//! - **health**: component checks and per-provider breaker status

pub mod cache;
pub mod circuit_breaker;
pub mod health;
pub mod models;
pub mod pipeline;
pub mod providers;
pub mod quota;
pub mod router;
#[cfg(test)]
pub(crate) mod testing;
pub mod traits;
pub mod types;
pub mod vault;
