//! Error types for the watch-pipeline crate.

use thiserror::Error;

/// Errors raised by a message source.
///
/// The pipeline never propagates these to its caller; a failed fetch is
/// logged and the evaluation proceeds over an empty batch.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The backend fetch failed.
    #[error("message fetch failed: {reason}")]
    FetchFailed {
        /// The reason the fetch failed.
        reason: String,
    },

    /// The requested channel is unknown to the source.
    #[error("unknown channel: {channel}")]
    UnknownChannel {
        /// The channel that was requested.
        channel: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_fetch_failed() {
        let err = SourceError::FetchFailed {
            reason: "rate limited".to_string(),
        };
        assert_eq!(err.to_string(), "message fetch failed: rate limited");
    }

    #[test]
    fn error_display_unknown_channel() {
        let err = SourceError::UnknownChannel {
            channel: "C404".to_string(),
        };
        assert_eq!(err.to_string(), "unknown channel: C404");
    }
}
