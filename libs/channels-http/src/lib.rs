//! HTTP contract layer for service channels.
//!
//! - [`response_wrapper`]: rewrites every response into the canonical envelope
//! - [`traceability`]: required consumer/channel header validation
//! - [`error`]: [`ApiError`] for handlers and the per-request [`ErrorSink`]
//! - [`canonical`]: [`CanonicalJson`] responder for pruned handler bodies
//! - [`stack`]: assembles the layers in their runtime order
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod canonical;
pub mod error;
pub mod response_wrapper;
pub mod stack;
pub mod traceability;

pub use canonical::CanonicalJson;
pub use error::{ApiError, ErrorSink, RecordedErrors};
pub use response_wrapper::{WrapperState, response_wrapper_middleware};
pub use stack::{ContractLayerConfig, apply_contract_layers, with_traceability};
pub use traceability::{TraceContext, TraceabilityRules, traceability_middleware};
