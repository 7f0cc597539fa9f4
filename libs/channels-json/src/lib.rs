//! Canonical JSON encoding for service channel payloads.
//!
//! Every body leaving the service goes through [`to_vec`]: the value is first
//! walked by the pruning serializer ([`prune`]), which drops empty leaves and
//! empty containers, and the result is encoded with `serde_json`.
//!
//! "Empty" means: `null`/`None`, unit, `false`, numeric zero, the empty string,
//! a sequence or map with no surviving entries, a struct with no surviving
//! fields, and the zero [`Timestamp`].
//!
//! Field names follow the serde attributes of the value being encoded, so
//! `#[serde(rename = "...")]` picks the wire name and `#[serde(skip)]` drops a
//! field unconditionally.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod error;
pub mod prune;
pub mod timestamp;

pub use error::EncodeError;
pub use prune::{prune, prune_value};
pub use timestamp::Timestamp;

use serde::Serialize;

/// Body emitted when nothing survives pruning.
pub const EMPTY_OBJECT: &[u8] = b"{}";

/// Prune `value` and encode the result as JSON bytes.
///
/// A value that prunes away entirely encodes as `{}`, never as `null`.
///
/// # Errors
/// Returns [`EncodeError`] if the value cannot be represented as JSON
/// (non-finite floats, non-scalar map keys, failing `Serialize` impls).
pub fn to_vec<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodeError> {
    match prune(value)? {
        Some(pruned) => Ok(serde_json::to_vec(&pruned)?),
        None => Ok(EMPTY_OBJECT.to_vec()),
    }
}

/// String flavour of [`to_vec`].
///
/// # Errors
/// Same as [`to_vec`].
pub fn to_string<T: Serialize + ?Sized>(value: &T) -> Result<String, EncodeError> {
    match prune(value)? {
        Some(pruned) => Ok(serde_json::to_string(&pruned)?),
        None => Ok("{}".to_owned()),
    }
}
