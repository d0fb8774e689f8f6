//! Protocol-level errors.

use thiserror::Error;

/// Errors decoding inbound wire messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Missing command")]
    MissingCommand,

    #[error("Signing key rejected for {0}")]
    SigningKeyRejected(String),
}
