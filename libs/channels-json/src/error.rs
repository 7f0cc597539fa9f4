use std::fmt::Display;

use thiserror::Error;

/// Failure while pruning or encoding a value.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EncodeError {
    /// Map keys must stringify (strings, chars, integers, bools, unit variants).
    #[error("map key must be a string, char, integer or bool")]
    KeyMustBeScalar,

    /// `NaN` and infinities have no JSON representation.
    #[error("non-finite float cannot be encoded as JSON")]
    NonFiniteFloat,

    /// 128-bit integer outside the range of JSON numbers.
    #[error("integer {0} does not fit into a JSON number")]
    NumberOutOfRange(String),

    /// Error raised by a `Serialize` implementation.
    #[error("{0}")]
    Custom(String),

    /// Final `serde_json` encoding step failed.
    #[error("JSON encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl serde::ser::Error for EncodeError {
    fn custom<T: Display>(msg: T) -> Self {
        Self::Custom(msg.to_string())
    }
}
