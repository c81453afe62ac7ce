//! Protocol error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Errors raised while encoding or decoding frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Value could not be serialized to JSON.
    #[error("failed to encode frame: {0}")]
    Encode(#[source] serde_json::Error),

    /// Text frame is not valid JSON for the expected shape.
    #[error("malformed frame: {0}")]
    Decode(#[source] serde_json::Error),
}
