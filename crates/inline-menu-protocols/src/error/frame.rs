//! Frame messaging errors.

use thiserror::Error;

/// Errors from a request/response round-trip to a page frame.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The frame is gone (navigated, removed iframe, closed tab).
    #[error("Frame {frame} of tab {tab} is detached")]
    Detached { tab: i64, frame: i64 },

    /// The frame did not answer in time.
    #[error("Frame request timed out: {0}")]
    Timeout(String),

    /// The underlying channel closed while the request was in flight.
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detached_display() {
        let err = FrameError::Detached { tab: 7, frame: 2 };
        assert_eq!(err.to_string(), "Frame 2 of tab 7 is detached");
    }

    #[test]
    fn test_timeout_display() {
        let err = FrameError::Timeout("getSubFrameOffsets".to_string());
        assert!(err.to_string().contains("getSubFrameOffsets"));
    }
}
