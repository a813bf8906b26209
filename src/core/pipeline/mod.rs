//! Request pipeline
//!
//! [`RequestPipeline`] composes routing, quota admission, the response cache and circuit
//! breaking into one request lifecycle. [`RequestContext`] carries the caller's identity,
//! cancellation token and deadline through it.

pub mod context;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use context::RequestContext;
pub use pipeline::{
    CompletionResult, DEFAULT_REQUEST_TIMEOUT, RequestPipeline, StreamSummary, validate_request,
};
