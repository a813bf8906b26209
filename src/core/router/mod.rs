//! Provider routing
//!
//! [`Router`] turns a model id into a provider instance plus credentials;
//! [`KeyBalancer`] spreads calls over a model's key pool.

pub mod balancer;
#[allow(clippy::module_inception)]
pub mod router;

pub use balancer::KeyBalancer;
pub use router::{Route, Router};
