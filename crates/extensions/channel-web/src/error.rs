//! Web channel errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Channel disconnected")]
    Disconnected,

    #[error("Receive failed: {0}")]
    ReceiveFailed(String),

    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),
}
