//! Contract-level error types.

use thiserror::Error;

/// Errors raised while building or decoding shared contract types.
#[derive(Debug, Error)]
pub enum Error {
    /// A function name outside the known set.
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// A serialized expression tree or option set could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Structurally invalid expression tree.
    #[error("invalid expression tree: {0}")]
    InvalidTree(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Deserialization(err.to_string())
    }
}
