//! Error types for the coordinator.

use thiserror::Error;

use inline_menu_protocols::{FrameError, ProtocolError, ProviderError};

/// Errors raised inside command handlers.
///
/// None of these reach the page: the router logs them and answers nothing.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A frame round-trip failed.
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// A collaborator failed.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// An inbound message could not be decoded.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The list referenced a credential that is not in the projection.
    #[error("Unknown inline menu credential: {0}")]
    UnknownCredential(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_from() {
        let err = CoordinatorError::from(FrameError::ChannelClosed);
        assert!(matches!(err, CoordinatorError::Frame(_)));
        assert!(err.to_string().starts_with("Frame error"));
    }

    #[test]
    fn test_provider_error_from() {
        let err = CoordinatorError::from(ProviderError::Locked);
        assert!(matches!(err, CoordinatorError::Provider(ProviderError::Locked)));
    }

    #[test]
    fn test_protocol_error_from() {
        let err = CoordinatorError::from(ProtocolError::MissingCommand);
        assert_eq!(err.to_string(), "Protocol error: Missing command");
    }

    #[test]
    fn test_unknown_credential_display() {
        let err = CoordinatorError::UnknownCredential("inline-menu-cipher-9".to_string());
        assert!(err.to_string().contains("inline-menu-cipher-9"));
    }
}
